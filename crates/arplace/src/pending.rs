//! Generation-tagged asynchronous work.
//!
//! Session requests, hit-test source requests and model loads cannot be
//! aborted once issued. Each is tagged with the [`Generation`] of the session
//! that issued it and polled without blocking at frame boundaries; the owner
//! compares the tag with its current generation before applying a result.

use std::fmt;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::task::noop_waker;

/// Identifies one session instance. Bumped every time a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

struct InFlight<T> {
    generation: Generation,
    future: BoxFuture<'static, T>,
}

/// Operations still outstanding, in issue order
pub struct InFlightQueue<T> {
    items: Vec<InFlight<T>>,
}

impl<T> InFlightQueue<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, generation: Generation, future: BoxFuture<'static, T>) {
        self.items.push(InFlight { generation, future });
    }

    /// Poll every outstanding operation once and return the ones that
    /// finished, tagged with the generation that issued them. Never blocks.
    pub fn poll_ready(&mut self) -> Vec<(Generation, T)> {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut ready = Vec::new();

        let mut i = 0;
        while i < self.items.len() {
            match self.items[i].future.as_mut().poll(&mut cx) {
                Poll::Ready(value) => {
                    let item = self.items.remove(i);
                    ready.push((item.generation, value));
                }
                Poll::Pending => i += 1,
            }
        }

        ready
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Outstanding operations issued by `generation`
    pub fn pending_for(&self, generation: Generation) -> usize {
        self.items.iter().filter(|i| i.generation == generation).count()
    }
}

impl<T> Default for InFlightQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for InFlightQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlightQueue")
            .field("pending", &self.items.len())
            .finish()
    }
}
