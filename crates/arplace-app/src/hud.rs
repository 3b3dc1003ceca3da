//! Status, notice and help overlay

use std::collections::VecDeque;

use arplace::{Notice, NoticeKind, SessionLifecycle, SessionState};
use crossterm::style::Color;
use unicode_width::UnicodeWidthChar;

use crate::terminal::OverlayLine;

const STATUS_COLOR: Color = Color::Rgb { r: 180, g: 220, b: 255 };
const HELP_COLOR: Color = Color::Rgb { r: 110, g: 120, b: 135 };
/// Frames a notice stays on screen
const NOTICE_TICKS: u32 = 80;
const MAX_NOTICES: usize = 3;

const HELP: &str = concat!(
    "E enter AR · WASD look · Space place · F wireframe · 1-9 model · ",
    "X exit · B back · R reset · Ctrl-Q quit"
);

/// Heads-up display fed from the lifecycle every tick
#[derive(Debug, Default)]
pub struct Hud {
    notices: VecDeque<(Notice, u32)>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back((notice, NOTICE_TICKS));
    }

    /// Age notices by one frame and drop expired ones
    pub fn tick(&mut self) {
        for (_, remaining) in &mut self.notices {
            *remaining = remaining.saturating_sub(1);
        }
        self.notices.retain(|(_, remaining)| *remaining > 0);
    }

    pub fn notice_count(&self) -> usize {
        self.notices.len()
    }

    /// Header and footer lines fitted to `width` cells
    pub fn lines(
        &self,
        lifecycle: &SessionLifecycle,
        width: u16,
    ) -> (Vec<OverlayLine>, Vec<OverlayLine>) {
        let status = fit(&status_line(lifecycle), width);
        let mut header = vec![OverlayLine::new(status, STATUS_COLOR)];
        for (notice, _) in &self.notices {
            header.push(OverlayLine::new(fit(&notice.message, width), notice_color(notice.kind)));
        }
        let footer = vec![OverlayLine::new(fit(HELP, width), HELP_COLOR)];
        (header, footer)
    }
}

fn notice_color(kind: NoticeKind) -> Color {
    match kind {
        NoticeKind::Info => Color::Cyan,
        NoticeKind::Unsupported => Color::Yellow,
        NoticeKind::LoadFailure => Color::Red,
    }
}

pub fn status_line(lifecycle: &SessionLifecycle) -> String {
    let settings = lifecycle.settings();
    let wireframe = if settings.wireframe() { "wireframe" } else { "solid" };

    match lifecycle.state() {
        SessionState::Idle => format!(
            "AR idle · model {} ({}) · press E to enter AR",
            settings.selected().name,
            wireframe
        ),
        SessionState::Starting => "AR starting…".to_string(),
        SessionState::Ending => "AR ending…".to_string(),
        SessionState::Active => {
            let surface = if !lifecycle.hit_test_available() {
                "no hit-test"
            } else if lifecycle.reticle().is_some_and(|r| r.is_visible()) {
                "surface found"
            } else {
                "searching"
            };
            let placement = if lifecycle.is_loading() {
                "loading…".to_string()
            } else if let Some(placed) = lifecycle.placed() {
                format!("placed {}", placed.url())
            } else {
                "tap to place".to_string()
            };
            format!(
                "AR active · {} · model {} ({}) · {}",
                surface,
                settings.selected().name,
                wireframe,
                placement
            )
        }
    }
}

/// Truncate to `width` display cells, marking the cut with an ellipsis
pub fn fit(text: &str, width: u16) -> String {
    let width = width as usize;
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
