//! Terminal viewport: projection, cell canvas and the render backend

mod backend;
mod canvas;
mod projection;

pub use backend::{OverlayLine, TerminalBackend};
pub use canvas::{Canvas, BACKGROUND};
pub use projection::Projection;
