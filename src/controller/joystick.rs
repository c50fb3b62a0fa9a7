//! # Joystick Tracker Module
//!
//! Maps pointer movement inside a circular zone to a normalized stick vector.
//!
//! ## Geometry
//!
//! A zone has a center and an on-screen width. The maximum travel radius is
//! `R = width * radius_fraction` (0.4 by default). For a raw displacement
//! `(dx, dy)` with length `d > R` the displacement is scaled by `R / d`, so
//! the reachable region is a circle rather than a square. The output is
//! `(dx / R, dy / R)`.
//!
//! ## Binding
//!
//! The first pointer to press an unbound zone owns the stick until it is
//! released. Presses from other pointers are ignored, and movement from any
//! pointer other than the owner has no effect.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::input::{Point, Pointer};
use super::state::{ControllerState, Stick, StickPosition};

/// Default travel radius as a fraction of zone width.
pub const DEFAULT_RADIUS_FRACTION: f64 = 0.4;

/// On-screen area of one joystick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoystickZone {
    /// Zone center in screen coordinates.
    pub center: Point,
    /// Zone width in pixels.
    pub width: f64,
}

impl JoystickZone {
    #[must_use]
    pub fn new(center: Point, width: f64) -> Self {
        Self { center, width }
    }

    /// Maximum travel radius for this zone.
    #[must_use]
    pub fn radius(&self, fraction: f64) -> f64 {
        self.width * fraction
    }
}

/// Clamps a raw displacement to a circle of `radius` and normalizes it.
///
/// # Examples
///
/// ```
/// use padlink::controller::joystick::normalize_displacement;
///
/// let inside = normalize_displacement(20.0, -10.0, 40.0);
/// assert_eq!((inside.x, inside.y), (0.5, -0.25));
///
/// let outside = normalize_displacement(300.0, 400.0, 40.0);
/// assert!((outside.magnitude() - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn normalize_displacement(dx: f64, dy: f64, radius: f64) -> StickPosition {
    let distance = dx.hypot(dy);
    let (dx, dy) = if distance > radius {
        let scale = radius / distance;
        (dx * scale, dy * scale)
    } else {
        (dx, dy)
    };
    StickPosition::new(dx / radius, dy / radius)
}

/// Tracks one joystick surface and its pointer binding.
#[derive(Debug, Clone)]
pub struct JoystickTracker {
    stick: Stick,
    zone: JoystickZone,
    radius_fraction: f64,
    binding: Option<Pointer>,
}

impl JoystickTracker {
    /// Creates an unbound tracker for `stick` over `zone`.
    #[must_use]
    pub fn new(stick: Stick, zone: JoystickZone, radius_fraction: f64) -> Self {
        Self {
            stick,
            zone,
            radius_fraction,
            binding: None,
        }
    }

    #[must_use]
    pub fn stick(&self) -> Stick {
        self.stick
    }

    #[must_use]
    pub fn zone(&self) -> JoystickZone {
        self.zone
    }

    /// Replaces the zone geometry, e.g. after a layout change.
    pub fn set_zone(&mut self, zone: JoystickZone) {
        self.zone = zone;
    }

    /// Pointer currently bound to this stick.
    #[must_use]
    pub fn binding(&self) -> Option<Pointer> {
        self.binding
    }

    /// Binds `pointer` if the stick is free and applies its position.
    ///
    /// Returns `true` if the stick was bound (and the state changed).
    pub fn press(&mut self, state: &mut ControllerState, pointer: Pointer, position: Point) -> bool {
        if self.binding.is_some() {
            debug!("Stick {:?} already bound, ignoring {:?}", self.stick, pointer);
            return false;
        }
        self.binding = Some(pointer);
        debug!("Stick {:?} bound to {:?}", self.stick, pointer);
        self.apply(state, position);
        true
    }

    /// Applies a movement if it comes from the bound pointer.
    ///
    /// Returns `true` if the state changed.
    pub fn move_to(&mut self, state: &mut ControllerState, pointer: Pointer, position: Point) -> bool {
        if self.binding != Some(pointer) {
            return false;
        }
        self.apply(state, position);
        true
    }

    /// Ends the gesture if `pointer` owns the stick.
    ///
    /// Returns `true` if the stick was reset.
    pub fn release(&mut self, state: &mut ControllerState, pointer: Pointer) -> bool {
        if self.binding != Some(pointer) {
            return false;
        }
        self.reset(state);
        true
    }

    /// Resets the stick to center and drops any binding, unconditionally.
    pub fn reset(&mut self, state: &mut ControllerState) {
        if let Some(pointer) = self.binding.take() {
            debug!("Stick {:?} released by {:?}", self.stick, pointer);
        }
        state.set_stick(self.stick, StickPosition::CENTER);
    }

    fn apply(&self, state: &mut ControllerState, position: Point) {
        let dx = position.x - self.zone.center.x;
        let dy = position.y - self.zone.center.y;
        let radius = self.zone.radius(self.radius_fraction);
        state.set_stick(self.stick, normalize_displacement(dx, dy, radius));
    }
}
