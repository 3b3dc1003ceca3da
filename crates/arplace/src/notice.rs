//! One-line user-facing messages

use std::collections::VecDeque;
use std::fmt;

use crate::error::ArError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Unsupported,
    LoadFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// Notice for a recoverable error; `None` for errors never shown to users
    pub fn from_error(error: &ArError) -> Option<Self> {
        let kind = match error {
            ArError::Unsupported(_) => NoticeKind::Unsupported,
            ArError::LoadFailure(_) => NoticeKind::LoadFailure,
            ArError::Render(_) => NoticeKind::Info,
            ArError::InvariantViolation(_) => return None,
        };
        Some(Self {
            kind,
            message: error.to_string(),
        })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Bounded queue of pending notices; the oldest is dropped when full
#[derive(Debug, Clone)]
pub struct Notices {
    queue: VecDeque<Notice>,
    capacity: usize,
}

impl Notices {
    pub const DEFAULT_CAPACITY: usize = 8;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, notice: Notice) {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(notice);
    }

    /// Queue the notice for `error` if it is user visible
    pub fn report(&mut self, error: &ArError) {
        if let Some(notice) = Notice::from_error(error) {
            self.push(notice);
        }
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.queue.back()
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        self.queue.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;

    #[test]
    fn test_invariant_violations_stay_hidden() {
        let mut notices = Notices::new();
        notices.report(&ArError::InvariantViolation("tick while idle".into()));
        assert!(notices.is_empty());

        notices.report(&ArError::LoadFailure(LoadError::NotFound("cone.glb".into())));
        let latest = notices.latest().unwrap();
        assert_eq!(latest.kind, NoticeKind::LoadFailure);
        assert!(latest.message.contains("cone.glb"));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut notices = Notices::with_capacity(2);
        notices.push(Notice::info("one"));
        notices.push(Notice::info("two"));
        notices.push(Notice::info("three"));

        let drained: Vec<String> = notices.drain().into_iter().map(|n| n.message).collect();
        assert_eq!(drained, vec!["two", "three"]);
        assert!(notices.is_empty());
    }
}
