//! # Feedback Module
//!
//! Haptic and visual side effects of control presses.
//!
//! Feedback is not part of the transport contract. Hosts without a
//! vibration motor report `supports_haptics() == false` and the session
//! skips haptics silently.

use tracing::debug;

use crate::controller::input::{Point, Surface};
use crate::controller::state::Button;

/// One-shot pulse emitted on the first press of a session.
pub const HAPTIC_UNLOCK: &[u32] = &[10];
/// Face, d-pad, shoulder and stick-click buttons.
pub const HAPTIC_BUTTON: &[u32] = &[20];
/// View and Menu.
pub const HAPTIC_SYSTEM: &[u32] = &[45];
/// Home (buzz, pause, buzz).
pub const HAPTIC_HOME: &[u32] = &[40, 30, 40];
/// Trigger press.
pub const HAPTIC_TRIGGER: &[u32] = &[15];
/// Joystick bind.
pub const HAPTIC_JOYSTICK: &[u32] = &[10];

/// Vibration pattern (alternating on/off milliseconds) for a button press.
#[must_use]
pub fn button_pattern(button: Button) -> &'static [u32] {
    match button {
        Button::Home => HAPTIC_HOME,
        b if b.is_system() => HAPTIC_SYSTEM,
        _ => HAPTIC_BUTTON,
    }
}

/// Output device for press feedback.
#[cfg_attr(test, mockall::automock)]
pub trait Feedback {
    /// Whether the host can vibrate.
    fn supports_haptics(&self) -> bool;

    /// Plays a vibration pattern in milliseconds (on, off, on, ...).
    fn vibrate(&mut self, pattern: &[u32]);

    /// Plays a visual ripple on `surface`, at `position` when known.
    fn pulse(&mut self, surface: Surface, position: Option<Point>);
}

/// Feedback sink that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl Feedback for NoFeedback {
    fn supports_haptics(&self) -> bool {
        false
    }

    fn vibrate(&mut self, _pattern: &[u32]) {}

    fn pulse(&mut self, _surface: Surface, _position: Option<Point>) {}
}

/// Feedback sink that records feedback in the log.
///
/// Used by the binary, which has no display or motor of its own.
#[derive(Debug, Clone, Copy)]
pub struct LogFeedback {
    haptics: bool,
}

impl LogFeedback {
    #[must_use]
    pub fn new(haptics: bool) -> Self {
        Self { haptics }
    }
}

impl Feedback for LogFeedback {
    fn supports_haptics(&self) -> bool {
        self.haptics
    }

    fn vibrate(&mut self, pattern: &[u32]) {
        debug!("Haptic pattern {:?}", pattern);
    }

    fn pulse(&mut self, surface: Surface, position: Option<Point>) {
        debug!("Visual pulse on {:?} at {:?}", surface, position);
    }
}
