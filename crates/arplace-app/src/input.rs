//! Keyboard stand-in for head tracking and the controller
//!
//! Maps key presses to simulator commands so the pipeline can run without AR
//! hardware.

use std::f32::consts::FRAC_PI_2;

use arplace::{Point3D, Quaternion, Transform};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// What a key press asks the simulator to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCommand {
    /// Head moved; the next frame carries the new pose
    Look,
    /// Controller select (air tap)
    Select,
    EnterAr,
    /// The app asks the session to end
    ExitAr,
    /// The system ends the session, like a back gesture
    PlatformEnd,
    Reset,
    ToggleWireframe,
    /// Zero-based catalog index
    PickModel(usize),
}

/// Head orientation driven by the keyboard
pub struct InputSimulator {
    head_yaw: f32,
    head_pitch: f32,
    head_speed: f32,
}

impl Default for InputSimulator {
    fn default() -> Self {
        Self {
            head_yaw: 0.0,
            head_pitch: -0.5,
            head_speed: 0.05,
        }
    }
}

impl InputSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a key press; releases and repeats of unmapped keys yield nothing
    pub fn process_key(&mut self, key: KeyEvent) -> Option<SimCommand> {
        if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
            return None;
        }

        let command = match key.code {
            // WASD and arrows: head rotation
            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => {
                self.head_pitch = (self.head_pitch + self.head_speed).min(FRAC_PI_2);
                SimCommand::Look
            }
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => {
                self.head_pitch = (self.head_pitch - self.head_speed).max(-FRAC_PI_2);
                SimCommand::Look
            }
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                self.head_yaw += self.head_speed;
                SimCommand::Look
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                self.head_yaw -= self.head_speed;
                SimCommand::Look
            }

            // Space/Enter: air tap
            KeyCode::Char(' ') | KeyCode::Enter => SimCommand::Select,

            KeyCode::Char('e') | KeyCode::Char('E') => SimCommand::EnterAr,
            KeyCode::Char('x') | KeyCode::Char('X') => SimCommand::ExitAr,
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc => SimCommand::PlatformEnd,
            KeyCode::Char('r') | KeyCode::Char('R') => SimCommand::Reset,
            KeyCode::Char('f') | KeyCode::Char('F') => SimCommand::ToggleWireframe,

            KeyCode::Char(c @ '1'..='9') => SimCommand::PickModel(c as usize - '1' as usize),

            _ => return None,
        };
        Some(command)
    }

    /// Head pose in the local tracking space; the head stays at the origin
    pub fn head_transform(&self) -> Transform {
        let rotation = Quaternion::from_yaw_pitch(self.head_yaw, self.head_pitch);
        Transform::from_position_rotation(Point3D::ORIGIN, rotation)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
