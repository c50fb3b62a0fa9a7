//! # Controller State Module
//!
//! The logical controller model that is streamed to the remote listener.
//!
//! ## Layout
//!
//! | Field | Wire key | Range | Description |
//! |-------|----------|-------|-------------|
//! | Left stick | `ls` | x, y in -1.0..=1.0 | Normalized displacement |
//! | Right stick | `rs` | x, y in -1.0..=1.0 | Normalized displacement |
//! | Left trigger | `lt` | 0.0..=1.0 | Analog actuation depth |
//! | Right trigger | `rt` | 0.0..=1.0 | Analog actuation depth |
//! | Buttons | `buttons` | bool | Keyed by [`Button::as_str`] |
//!
//! Stick Y follows screen coordinates: positive is down.
//!
//! ## Usage
//!
//! ```
//! use padlink::controller::state::{Button, ControllerState};
//!
//! let mut state = ControllerState::new();
//! assert!(!state.is_pressed(Button::A));
//!
//! state.set_button(Button::A, true);
//! assert!(state.is_pressed(Button::A));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Stick axis value at rest.
pub const AXIS_CENTER: f64 = 0.0;
/// Trigger value when fully released.
pub const TRIGGER_RELEASED: f64 = 0.0;
/// Trigger value when fully pulled.
pub const TRIGGER_PULLED: f64 = 1.0;

/// Digital buttons of the virtual controller.
///
/// Serialized with the identifiers the remote listener expects
/// (`a`, `dpad-up`, `ls-click`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Button {
    A,
    B,
    X,
    Y,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Lb,
    Rb,
    View,
    Menu,
    Home,
    LsClick,
    RsClick,
}

impl Button {
    /// Every button, in wire order.
    pub const ALL: [Button; 15] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::DpadUp,
        Button::DpadDown,
        Button::DpadLeft,
        Button::DpadRight,
        Button::Lb,
        Button::Rb,
        Button::View,
        Button::Menu,
        Button::Home,
        Button::LsClick,
        Button::RsClick,
    ];

    /// Wire identifier of this button.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Button::A => "a",
            Button::B => "b",
            Button::X => "x",
            Button::Y => "y",
            Button::DpadUp => "dpad-up",
            Button::DpadDown => "dpad-down",
            Button::DpadLeft => "dpad-left",
            Button::DpadRight => "dpad-right",
            Button::Lb => "lb",
            Button::Rb => "rb",
            Button::View => "view",
            Button::Menu => "menu",
            Button::Home => "home",
            Button::LsClick => "ls-click",
            Button::RsClick => "rs-click",
        }
    }

    /// System buttons get a distinct haptic pattern.
    #[must_use]
    pub fn is_system(self) -> bool {
        matches!(self, Button::View | Button::Menu | Button::Home)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Button {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Button::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| format!("unknown button '{}'", s))
    }
}

/// Analog triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Left trigger (`lt`).
    Lt,
    /// Right trigger (`rt`).
    Rt,
}

impl Trigger {
    /// Both triggers.
    pub const ALL: [Trigger; 2] = [Trigger::Lt, Trigger::Rt];

    pub(crate) fn index(self) -> usize {
        match self {
            Trigger::Lt => 0,
            Trigger::Rt => 1,
        }
    }
}

/// Analog sticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stick {
    /// Left stick (`ls`).
    Ls,
    /// Right stick (`rs`).
    Rs,
}

impl Stick {
    /// Both sticks.
    pub const ALL: [Stick; 2] = [Stick::Ls, Stick::Rs];
}

/// Normalized stick displacement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StickPosition {
    pub x: f64,
    pub y: f64,
}

impl StickPosition {
    /// Stick at rest.
    pub const CENTER: StickPosition = StickPosition {
        x: AXIS_CENTER,
        y: AXIS_CENTER,
    };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the displacement vector.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Complete logical state of the virtual controller.
///
/// Constructed at rest, so every field is always defined. Buttons that were
/// never touched are absent from the map, which reads as released.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerState {
    /// Left stick.
    #[serde(rename = "ls")]
    pub left_stick: StickPosition,
    /// Right stick.
    #[serde(rename = "rs")]
    pub right_stick: StickPosition,
    /// Button pressed flags.
    #[serde(default)]
    pub buttons: BTreeMap<Button, bool>,
    /// Left trigger depth.
    #[serde(rename = "lt")]
    pub left_trigger: f64,
    /// Right trigger depth.
    #[serde(rename = "rt")]
    pub right_trigger: f64,
}

impl ControllerState {
    /// Creates a controller state at rest.
    ///
    /// # Examples
    ///
    /// ```
    /// use padlink::controller::state::{ControllerState, StickPosition};
    ///
    /// let state = ControllerState::new();
    /// assert_eq!(state.left_stick, StickPosition::CENTER);
    /// assert_eq!(state.left_trigger, 0.0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `button` is pressed. Missing keys read as released.
    #[must_use]
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons.get(&button).copied().unwrap_or(false)
    }

    /// Sets the pressed flag for `button`.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.buttons.insert(button, pressed);
    }

    #[must_use]
    pub fn stick(&self, stick: Stick) -> StickPosition {
        match stick {
            Stick::Ls => self.left_stick,
            Stick::Rs => self.right_stick,
        }
    }

    pub fn set_stick(&mut self, stick: Stick, position: StickPosition) {
        match stick {
            Stick::Ls => self.left_stick = position,
            Stick::Rs => self.right_stick = position,
        }
    }

    #[must_use]
    pub fn trigger(&self, trigger: Trigger) -> f64 {
        match trigger {
            Trigger::Lt => self.left_trigger,
            Trigger::Rt => self.right_trigger,
        }
    }

    pub fn set_trigger(&mut self, trigger: Trigger, value: f64) {
        match trigger {
            Trigger::Lt => self.left_trigger = value,
            Trigger::Rt => self.right_trigger = value,
        }
    }

    /// Checks if any button is currently pressed.
    #[must_use]
    pub fn any_button_pressed(&self) -> bool {
        self.buttons.values().any(|&pressed| pressed)
    }

    /// Checks if the controller is entirely at rest.
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.left_stick == StickPosition::CENTER
            && self.right_stick == StickPosition::CENTER
            && self.left_trigger == TRIGGER_RELEASED
            && self.right_trigger == TRIGGER_RELEASED
            && !self.any_button_pressed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_state_default_is_at_rest() {
        let state = ControllerState::default();

        assert_eq!(state.left_stick, StickPosition::CENTER);
        assert_eq!(state.right_stick, StickPosition::CENTER);
        assert_eq!(state.left_trigger, TRIGGER_RELEASED);
        assert_eq!(state.right_trigger, TRIGGER_RELEASED);
        assert!(state.buttons.is_empty());
        assert!(state.is_at_rest());
    }

    #[test]
    fn test_missing_button_reads_released() {
        let state = ControllerState::new();
        for button in Button::ALL {
            assert!(!state.is_pressed(button), "{} should read released", button);
        }
    }

    #[test]
    fn test_released_button_keeps_key() {
        let mut state = ControllerState::new();
        state.set_button(Button::B, true);
        state.set_button(Button::B, false);

        assert_eq!(state.buttons.get(&Button::B), Some(&false));
        assert!(!state.is_pressed(Button::B));
        assert!(state.is_at_rest());
    }

    #[test]
    fn test_stick_and_trigger_accessors() {
        let mut state = ControllerState::new();
        state.set_stick(Stick::Rs, StickPosition::new(0.5, -0.25));
        state.set_trigger(Trigger::Lt, 0.7);

        assert_eq!(state.stick(Stick::Rs), StickPosition::new(0.5, -0.25));
        assert_eq!(state.stick(Stick::Ls), StickPosition::CENTER);
        assert_eq!(state.trigger(Trigger::Lt), 0.7);
        assert_eq!(state.trigger(Trigger::Rt), 0.0);
        assert!(!state.is_at_rest());
    }

    #[test]
    fn test_button_identifiers() {
        let ids: Vec<&str> = Button::ALL.iter().map(|b| b.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "a", "b", "x", "y", "dpad-up", "dpad-down", "dpad-left", "dpad-right", "lb",
                "rb", "view", "menu", "home", "ls-click", "rs-click"
            ]
        );
    }

    #[test]
    fn test_button_from_str() {
        assert_eq!("dpad-left".parse::<Button>(), Ok(Button::DpadLeft));
        assert_eq!("rs-click".parse::<Button>(), Ok(Button::RsClick));
        assert!("start".parse::<Button>().is_err());
    }

    #[test]
    fn test_button_serde_matches_as_str() {
        for button in Button::ALL {
            let json = serde_json::to_string(&button).unwrap();
            assert_eq!(json, format!("\"{}\"", button.as_str()));
        }
    }

    #[test]
    fn test_system_buttons() {
        assert!(Button::View.is_system());
        assert!(Button::Menu.is_system());
        assert!(Button::Home.is_system());
        assert!(!Button::A.is_system());
        assert!(!Button::LsClick.is_system());
    }

    #[test]
    fn test_wire_shape() {
        let mut state = ControllerState::new();
        state.set_button(Button::A, true);
        state.left_stick = StickPosition::new(1.0, 0.0);
        state.right_trigger = 0.5;

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "ls": {"x": 1.0, "y": 0.0},
                "rs": {"x": 0.0, "y": 0.0},
                "buttons": {"a": true},
                "lt": 0.0,
                "rt": 0.5,
            })
        );
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(StickPosition::new(3.0, 4.0).magnitude(), 5.0);
        assert_eq!(StickPosition::CENTER.magnitude(), 0.0);
    }
}
