//! # Button Tracker Module
//!
//! Idempotent press/release tracking for digital buttons.
//!
//! Touch and synthesized mouse events often arrive for the same physical
//! tap, so a press on an already pressed button and a release on an already
//! released button are both no-ops. Only real edges change state.

use tracing::debug;

use super::state::{Button, ControllerState};

/// Edge produced by a button signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEdge {
    /// Button went from released to pressed.
    Pressed,
    /// Button went from pressed to released.
    Released,
    /// Signal matched the current state; nothing changed.
    Unchanged,
}

impl ButtonEdge {
    /// Whether the signal mutated the controller state.
    #[must_use]
    pub fn is_change(self) -> bool {
        self != ButtonEdge::Unchanged
    }
}

/// Tracks pressed flags for all digital buttons.
///
/// The flags themselves live in [`ControllerState::buttons`]; the tracker
/// only decides whether a signal is an edge.
#[derive(Debug, Default, Clone, Copy)]
pub struct ButtonTracker;

impl ButtonTracker {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Handles a press-start signal.
    ///
    /// # Examples
    ///
    /// ```
    /// use padlink::controller::buttons::{ButtonEdge, ButtonTracker};
    /// use padlink::controller::state::{Button, ControllerState};
    ///
    /// let tracker = ButtonTracker::new();
    /// let mut state = ControllerState::new();
    ///
    /// assert_eq!(tracker.press(&mut state, Button::A), ButtonEdge::Pressed);
    /// assert_eq!(tracker.press(&mut state, Button::A), ButtonEdge::Unchanged);
    /// ```
    pub fn press(&self, state: &mut ControllerState, button: Button) -> ButtonEdge {
        if state.is_pressed(button) {
            return ButtonEdge::Unchanged;
        }
        state.set_button(button, true);
        debug!("Button {} pressed", button);
        ButtonEdge::Pressed
    }

    /// Handles a press-end signal. A release with no prior press is ignored.
    pub fn release(&self, state: &mut ControllerState, button: Button) -> ButtonEdge {
        if !state.is_pressed(button) {
            return ButtonEdge::Unchanged;
        }
        state.set_button(button, false);
        debug!("Button {} released", button);
        ButtonEdge::Released
    }
}
