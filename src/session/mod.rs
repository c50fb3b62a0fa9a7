//! # Capture Session Module
//!
//! Owns the controller state and everything that mutates or reads it.
//!
//! A [`CaptureSession`] is the single mutation funnel: input events go in
//! through [`CaptureSession::handle`], ramp ticks through
//! [`CaptureSession::tick_ramps`], and the frame callback
//! [`CaptureSession::frame`] hands at most one snapshot to the transport.
//! All of it runs on one task, so the state needs no locking.
//!
//! ## Usage
//!
//! ```
//! use padlink::controller::input::{InputEvent, Pointer, Surface};
//! use padlink::controller::state::{Button, ControllerState};
//! use padlink::feedback::NoFeedback;
//! use padlink::session::{CaptureSession, SessionOptions};
//! use padlink::transport::Transport;
//!
//! struct Stdout;
//!
//! impl Transport for Stdout {
//!     fn is_connected(&self) -> bool { true }
//!     fn send(&mut self, state: &ControllerState) { println!("{:?}", state); }
//! }
//!
//! let mut session = CaptureSession::new(Stdout, NoFeedback, SessionOptions::default());
//! session.handle(InputEvent::Press {
//!     pointer: Pointer::Touch(0),
//!     surface: Surface::Button(Button::A),
//!     position: None,
//! });
//! assert!(session.frame());
//! ```

pub mod emitter;

use tracing::{debug, info, warn};

use crate::config::{Config, JoystickConfig};
use crate::controller::buttons::ButtonTracker;
use crate::controller::input::{InputEvent, Point, Pointer, Surface};
use crate::controller::joystick::{JoystickTracker, JoystickZone, DEFAULT_RADIUS_FRACTION};
use crate::controller::ramp::{RampEngine, RAMP_STEP};
use crate::controller::state::{Button, ControllerState, Stick, Trigger};
use crate::feedback::{button_pattern, Feedback, HAPTIC_JOYSTICK, HAPTIC_TRIGGER, HAPTIC_UNLOCK};
use crate::transport::{Transport, TransportEvent};
use emitter::{Emitter, EmitterStats};

/// Tunables for a capture session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Trigger ramp step per tick.
    pub ramp_step: f64,
    /// Joystick travel radius as a fraction of zone width.
    pub radius_fraction: f64,
    /// Left stick zone.
    pub left_zone: JoystickZone,
    /// Right stick zone.
    pub right_zone: JoystickZone,
}

impl Default for SessionOptions {
    fn default() -> Self {
        let joystick = JoystickConfig::default();
        Self {
            ramp_step: RAMP_STEP,
            radius_fraction: DEFAULT_RADIUS_FRACTION,
            left_zone: joystick.left.zone(),
            right_zone: joystick.right.zone(),
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            ramp_step: config.ramp.step,
            radius_fraction: config.joystick.radius_fraction,
            left_zone: config.joystick.left.zone(),
            right_zone: config.joystick.right.zone(),
        }
    }
}

/// Summary of a session's activity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Input events received (including ignored ones).
    pub events: u64,
    /// Input events that changed the state.
    pub mutations: u64,
    /// Emitter counters.
    pub emitter: EmitterStats,
}

/// A running capture-and-transport session.
pub struct CaptureSession<T, F> {
    state: ControllerState,
    buttons: ButtonTracker,
    sticks: [JoystickTracker; 2],
    ramps: RampEngine,
    emitter: Emitter,
    transport: T,
    feedback: F,
    suspended: bool,
    haptics_unlocked: bool,
    player_id: Option<u32>,
    events: u64,
    mutations: u64,
}

impl<T: Transport, F: Feedback> CaptureSession<T, F> {
    /// Creates a session with the controller at rest.
    pub fn new(transport: T, feedback: F, options: SessionOptions) -> Self {
        Self {
            state: ControllerState::new(),
            buttons: ButtonTracker::new(),
            sticks: [
                JoystickTracker::new(Stick::Ls, options.left_zone, options.radius_fraction),
                JoystickTracker::new(Stick::Rs, options.right_zone, options.radius_fraction),
            ],
            ramps: RampEngine::new(options.ramp_step),
            emitter: Emitter::new(),
            transport,
            feedback,
            suspended: false,
            haptics_unlocked: false,
            player_id: None,
            events: 0,
            mutations: 0,
        }
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Player number assigned by the listener, while connected.
    pub fn player_id(&self) -> Option<u32> {
        self.player_id
    }

    /// Ignore all input while `true` (e.g. while the layout is being edited).
    pub fn set_suspended(&mut self, suspended: bool) {
        if self.suspended != suspended {
            info!("Input {}", if suspended { "suspended" } else { "resumed" });
        }
        self.suspended = suspended;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Replaces a joystick zone after a layout change.
    pub fn set_zone(&mut self, stick: Stick, zone: JoystickZone) {
        self.sticks[stick_index(stick)].set_zone(zone);
    }

    /// Whether a flush is armed for the next frame.
    pub fn has_pending_frame(&self) -> bool {
        self.emitter.is_pending()
    }

    /// Whether no trigger ramp is running.
    pub fn ramps_idle(&self) -> bool {
        self.ramps.is_idle()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            events: self.events,
            mutations: self.mutations,
            emitter: self.emitter.stats(),
        }
    }

    /// Applies one input event.
    pub fn handle(&mut self, event: InputEvent) {
        self.events += 1;

        // Editor events are honored while suspended
        match event {
            InputEvent::EditMode { enabled } => {
                self.set_suspended(enabled);
                return;
            }
            InputEvent::Layout { stick, zone } => {
                self.set_zone(stick, zone);
                return;
            }
            _ => {}
        }

        if self.suspended {
            debug!("Suspended, ignoring {:?}", event);
            return;
        }

        let changed = match event {
            InputEvent::Press {
                pointer,
                surface,
                position,
            } => self.press(pointer, surface, position),
            InputEvent::Move { pointer, position } => self.move_pointer(pointer, position),
            InputEvent::Release { pointer, surface } => self.release(pointer, surface),
            InputEvent::Cancel { surface } => self.cancel(surface),
            InputEvent::EditMode { .. } | InputEvent::Layout { .. } => false,
        };

        if changed {
            self.mutations += 1;
            self.mark_dirty();
        }
    }

    /// Advances trigger ramps by one tick.
    pub fn tick_ramps(&mut self) {
        if self.ramps.tick(&mut self.state) {
            self.mark_dirty();
        }
    }

    /// Frame callback. Returns `true` if a snapshot was sent.
    pub fn frame(&mut self) -> bool {
        self.emitter.flush(&self.state, &mut self.transport)
    }

    /// Applies a lifecycle notification from the transport.
    pub fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => info!("Transport connected"),
            TransportEvent::Disconnected => {
                info!("Transport disconnected");
                self.player_id = None;
            }
            TransportEvent::PlayerId(id) => {
                info!("Playing as P{}", id);
                self.player_id = Some(id);
            }
            TransportEvent::ServerError(message) => warn!("Listener reported: {}", message),
            TransportEvent::ConnectFailed(reason) => debug!("Connect attempt failed: {}", reason),
        }
    }

    fn press(&mut self, pointer: Pointer, surface: Surface, position: Option<Point>) -> bool {
        match surface {
            Surface::Button(button) => {
                if !self.buttons.press(&mut self.state, button).is_change() {
                    return false;
                }
                self.unlock_haptics();
                self.vibrate(button_pattern(button));
                self.feedback.pulse(surface, position);
                true
            }
            Surface::Trigger(trigger) => {
                self.unlock_haptics();
                self.vibrate(HAPTIC_TRIGGER);
                self.feedback.pulse(surface, position);
                self.ramps.press(trigger);
                // Value changes arrive with the ramp ticks
                false
            }
            Surface::Stick(stick) => {
                let tracker = &mut self.sticks[stick_index(stick)];
                let position = position.unwrap_or(tracker.zone().center);
                if !tracker.press(&mut self.state, pointer, position) {
                    return false;
                }
                self.unlock_haptics();
                self.vibrate(HAPTIC_JOYSTICK);
                true
            }
        }
    }

    fn move_pointer(&mut self, pointer: Pointer, position: Point) -> bool {
        let mut changed = false;
        for tracker in self.sticks.iter_mut() {
            changed |= tracker.move_to(&mut self.state, pointer, position);
        }
        changed
    }

    fn release(&mut self, pointer: Pointer, surface: Surface) -> bool {
        match surface {
            Surface::Button(button) => self.release_button(button),
            Surface::Trigger(trigger) => self.release_trigger(trigger),
            Surface::Stick(stick) => {
                self.sticks[stick_index(stick)].release(&mut self.state, pointer)
            }
        }
    }

    fn cancel(&mut self, surface: Surface) -> bool {
        match surface {
            Surface::Button(button) => self.release_button(button),
            Surface::Trigger(trigger) => self.release_trigger(trigger),
            Surface::Stick(stick) => {
                self.sticks[stick_index(stick)].reset(&mut self.state);
                true
            }
        }
    }

    fn release_button(&mut self, button: Button) -> bool {
        self.buttons.release(&mut self.state, button).is_change()
    }

    fn release_trigger(&mut self, trigger: Trigger) -> bool {
        self.ramps.release(trigger);
        false
    }

    fn mark_dirty(&mut self) {
        if self.emitter.mark_dirty(self.transport.is_connected()) {
            debug!("Frame requested");
        }
    }

    fn unlock_haptics(&mut self) {
        if self.haptics_unlocked {
            return;
        }
        self.haptics_unlocked = true;
        self.vibrate(HAPTIC_UNLOCK);
    }

    fn vibrate(&mut self, pattern: &[u32]) {
        if self.feedback.supports_haptics() {
            self.feedback.vibrate(pattern);
        }
    }
}

fn stick_index(stick: Stick) -> usize {
    match stick {
        Stick::Ls => 0,
        Stick::Rs => 1,
    }
}
