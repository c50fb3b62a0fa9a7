//! # Input Event Module
//!
//! Modality-agnostic input events fed into a capture session.
//!
//! A touch front-end translates raw touch and mouse callbacks into
//! [`InputEvent`]s. Touch points carry their platform identifier, the mouse
//! is a single pointer. Once an event exists the trackers no longer care
//! where it came from.
//!
//! ## JSON form
//!
//! Events are read by the binary as one JSON object per line:
//!
//! ```text
//! {"type":"press","pointer":{"touch":3},"surface":{"button":"a"}}
//! {"type":"press","pointer":"mouse","surface":{"stick":"ls"},"position":{"x":110.0,"y":420.0}}
//! {"type":"move","pointer":"mouse","position":{"x":130.0,"y":400.0}}
//! {"type":"release","pointer":"mouse","surface":{"stick":"ls"}}
//! {"type":"cancel","surface":{"trigger":"rt"}}
//! {"type":"edit_mode","enabled":true}
//! {"type":"layout","stick":"ls","zone":{"center":{"x":200.0,"y":400.0},"width":160.0}}
//! ```
//!
//! `edit_mode` and `layout` come from the front-end's layout editor rather
//! than from a pointer.

use serde::{Deserialize, Serialize};

use super::joystick::JoystickZone;
use super::state::{Button, Stick, Trigger};

/// A physical pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pointer {
    /// A touch point, keyed by its platform identifier.
    Touch(u32),
    /// The mouse.
    Mouse,
}

/// A point in screen coordinates (pixels, Y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One logical control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Button(Button),
    Trigger(Trigger),
    Stick(Stick),
}

/// A press, move, release or cancel signal from one pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer went down on a surface.
    Press {
        pointer: Pointer,
        surface: Surface,
        #[serde(default)]
        position: Option<Point>,
    },
    /// Pointer moved. Only sticks bound to this pointer react.
    Move { pointer: Pointer, position: Point },
    /// Pointer went up (or left the surface).
    Release { pointer: Pointer, surface: Surface },
    /// The platform cancelled all interaction with a surface.
    Cancel { surface: Surface },
    /// Layout editor opened or closed. Pointer input is ignored while enabled.
    EditMode { enabled: bool },
    /// A joystick zone was moved or resized.
    Layout { stick: Stick, zone: JoystickZone },
}

impl InputEvent {
    /// Pointer that produced this event, if any.
    #[must_use]
    pub fn pointer(&self) -> Option<Pointer> {
        match *self {
            InputEvent::Press { pointer, .. }
            | InputEvent::Move { pointer, .. }
            | InputEvent::Release { pointer, .. } => Some(pointer),
            InputEvent::Cancel { .. }
            | InputEvent::EditMode { .. }
            | InputEvent::Layout { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_button_press() {
        let event: InputEvent = serde_json::from_str(
            r#"{"type":"press","pointer":{"touch":3},"surface":{"button":"dpad-up"}}"#,
        )
        .unwrap();

        assert_eq!(
            event,
            InputEvent::Press {
                pointer: Pointer::Touch(3),
                surface: Surface::Button(Button::DpadUp),
                position: None,
            }
        );
    }

    #[test]
    fn test_parse_stick_press_with_position() {
        let event: InputEvent = serde_json::from_str(
            r#"{"type":"press","pointer":"mouse","surface":{"stick":"ls"},"position":{"x":10.5,"y":20.0}}"#,
        )
        .unwrap();

        assert_eq!(
            event,
            InputEvent::Press {
                pointer: Pointer::Mouse,
                surface: Surface::Stick(Stick::Ls),
                position: Some(Point::new(10.5, 20.0)),
            }
        );
    }

    #[test]
    fn test_parse_move_release_cancel() {
        let moved: InputEvent =
            serde_json::from_str(r#"{"type":"move","pointer":{"touch":1},"position":{"x":1.0,"y":2.0}}"#)
                .unwrap();
        assert_eq!(moved.pointer(), Some(Pointer::Touch(1)));

        let released: InputEvent = serde_json::from_str(
            r#"{"type":"release","pointer":"mouse","surface":{"trigger":"lt"}}"#,
        )
        .unwrap();
        assert_eq!(
            released,
            InputEvent::Release {
                pointer: Pointer::Mouse,
                surface: Surface::Trigger(Trigger::Lt),
            }
        );

        let cancelled: InputEvent =
            serde_json::from_str(r#"{"type":"cancel","surface":{"stick":"rs"}}"#).unwrap();
        assert_eq!(cancelled.pointer(), None);
    }

    #[test]
    fn test_parse_editor_events() {
        let edit: InputEvent = serde_json::from_str(r#"{"type":"edit_mode","enabled":true}"#).unwrap();
        assert_eq!(edit, InputEvent::EditMode { enabled: true });
        assert_eq!(edit.pointer(), None);

        let layout: InputEvent = serde_json::from_str(
            r#"{"type":"layout","stick":"rs","zone":{"center":{"x":600.0,"y":380.0},"width":150.0}}"#,
        )
        .unwrap();
        assert_eq!(
            layout,
            InputEvent::Layout {
                stick: Stick::Rs,
                zone: JoystickZone::new(Point::new(600.0, 380.0), 150.0),
            }
        );
    }

    #[test]
    fn test_unknown_surface_rejected() {
        let result = serde_json::from_str::<InputEvent>(
            r#"{"type":"press","pointer":"mouse","surface":{"button":"start"}}"#,
        );
        assert!(result.is_err());
    }
}
