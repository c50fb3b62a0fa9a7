//! # Analog Ramp Module
//!
//! Turns digital trigger presses into smooth analog ramps.
//!
//! A virtual trigger has no travel, so a press starts a ramp that moves the
//! trigger value toward 1.0 by a fixed step per tick and a release starts a
//! ramp back toward 0.0. Starting a ramp cancels any ramp already running for
//! the same trigger, so a trigger released halfway decays from where it was.
//!
//! The engine does not own a timer. The caller invokes [`RampEngine::tick`]
//! once per tick period (16 ms by default); tests call it directly.
//!
//! ## Termination
//!
//! Each tick clamps first and then compares the value to the target with
//! exact equality. The clamp snaps the final step onto 0.0 or 1.0, which
//! ends the session. From a start value `v0` a pull therefore takes
//! `ceil((1 - v0) / step)` ticks.

use tracing::{debug, trace};

use super::state::{ControllerState, Trigger, TRIGGER_PULLED, TRIGGER_RELEASED};

/// Default trigger value change per tick.
pub const RAMP_STEP: f64 = 0.07;

/// Default tick period in milliseconds (~60 Hz).
pub const RAMP_TICK_MS: u64 = 16;

/// Cancellation token identifying one ramp session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RampToken(u64);

/// An in-flight ramp for one trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampSession {
    /// Trigger being driven.
    pub trigger: Trigger,
    /// Endpoint, either 0.0 or 1.0.
    pub target: f64,
    /// Token that identifies this session.
    pub token: RampToken,
}

/// Drives trigger ramps for both triggers.
#[derive(Debug, Clone)]
pub struct RampEngine {
    step: f64,
    sessions: [Option<RampSession>; 2],
    next_token: u64,
}

impl Default for RampEngine {
    fn default() -> Self {
        Self::new(RAMP_STEP)
    }
}

impl RampEngine {
    /// Creates an idle engine with the given step size.
    #[must_use]
    pub fn new(step: f64) -> Self {
        Self {
            step,
            sessions: [None, None],
            next_token: 0,
        }
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Starts a ramp toward fully pulled.
    pub fn press(&mut self, trigger: Trigger) -> RampToken {
        self.start(trigger, TRIGGER_PULLED)
    }

    /// Starts a ramp toward fully released.
    pub fn release(&mut self, trigger: Trigger) -> RampToken {
        self.start(trigger, TRIGGER_RELEASED)
    }

    fn start(&mut self, trigger: Trigger, target: f64) -> RampToken {
        if let Some(previous) = self.cancel(trigger) {
            debug!("Cancelled ramp {:?} on {:?}", previous.token, trigger);
        }
        let token = RampToken(self.next_token);
        self.next_token += 1;
        self.sessions[trigger.index()] = Some(RampSession {
            trigger,
            target,
            token,
        });
        debug!("Started ramp {:?} on {:?} toward {}", token, trigger, target);
        token
    }

    /// Cancels the running ramp for `trigger`, returning it if there was one.
    pub fn cancel(&mut self, trigger: Trigger) -> Option<RampSession> {
        self.sessions[trigger.index()].take()
    }

    /// The running ramp for `trigger`.
    #[must_use]
    pub fn session(&self, trigger: Trigger) -> Option<RampSession> {
        self.sessions[trigger.index()]
    }

    #[must_use]
    pub fn is_active(&self, trigger: Trigger) -> bool {
        self.sessions[trigger.index()].is_some()
    }

    /// No ramp is running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.sessions.iter().all(Option::is_none)
    }

    /// Advances every running ramp by one step.
    ///
    /// Returns `true` if any trigger value changed.
    pub fn tick(&mut self, state: &mut ControllerState) -> bool {
        let mut changed = false;

        for slot in self.sessions.iter_mut() {
            let Some(session) = *slot else {
                continue;
            };

            let current = state.trigger(session.trigger);
            let next = if session.target == TRIGGER_PULLED {
                (current + self.step).min(TRIGGER_PULLED)
            } else {
                (current - self.step).max(TRIGGER_RELEASED)
            };

            if next != current {
                state.set_trigger(session.trigger, next);
                changed = true;
            }
            trace!("Ramp {:?} on {:?}: {} -> {}", session.token, session.trigger, current, next);

            if next == session.target {
                debug!("Ramp {:?} on {:?} reached {}", session.token, session.trigger, next);
                *slot = None;
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ticks until the trigger's ramp ends, returning the tick count.
    fn run_to_completion(engine: &mut RampEngine, state: &mut ControllerState, trigger: Trigger) -> usize {
        let mut ticks = 0;
        while engine.is_active(trigger) {
            engine.tick(state);
            ticks += 1;
            assert!(ticks < 1000, "ramp never terminated");
        }
        ticks
    }

    #[test]
    fn test_constants() {
        assert_eq!(RAMP_STEP, 0.07);
        assert_eq!(RAMP_TICK_MS, 16);
    }

    #[test]
    fn test_press_ramp_from_rest() {
        let mut engine = RampEngine::default();
        let mut state = ControllerState::new();

        engine.press(Trigger::Lt);
        let ticks = run_to_completion(&mut engine, &mut state, Trigger::Lt);

        assert_eq!(ticks, 15);
        assert_eq!(state.left_trigger, 1.0);
        assert_eq!(state.right_trigger, 0.0);
    }

    #[test]
    fn test_press_ramp_tick_count_matches_ceil() {
        for &v0 in &[0.0, 0.25, 0.5] {
            let mut engine = RampEngine::default();
            let mut state = ControllerState::new();
            state.right_trigger = v0;

            engine.press(Trigger::Rt);
            let ticks = run_to_completion(&mut engine, &mut state, Trigger::Rt);

            let expected = ((1.0 - v0) / RAMP_STEP).ceil() as usize;
            assert_eq!(ticks, expected, "start value {}", v0);
            assert_eq!(state.right_trigger, 1.0);
        }
    }

    #[test]
    fn test_release_ramp_floor() {
        for &v0 in &[1.0, 0.5] {
            let mut engine = RampEngine::default();
            let mut state = ControllerState::new();
            state.left_trigger = v0;

            engine.release(Trigger::Lt);
            let ticks = run_to_completion(&mut engine, &mut state, Trigger::Lt);

            let expected = (v0 / RAMP_STEP).ceil() as usize;
            assert_eq!(ticks, expected, "start value {}", v0);
            assert_eq!(state.left_trigger, 0.0);
        }
    }

    #[test]
    fn test_ramp_is_monotonic_and_stops() {
        let mut engine = RampEngine::default();
        let mut state = ControllerState::new();

        engine.press(Trigger::Lt);
        let mut last = state.left_trigger;
        while engine.is_active(Trigger::Lt) {
            assert!(engine.tick(&mut state));
            assert!(state.left_trigger > last);
            assert!(state.left_trigger <= 1.0);
            last = state.left_trigger;
        }

        // Finished ramps no longer advance or report changes
        assert!(!engine.tick(&mut state));
        assert_eq!(state.left_trigger, 1.0);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_release_mid_ramp_decays_from_current_value() {
        let mut engine = RampEngine::default();
        let mut state = ControllerState::new();

        engine.press(Trigger::Rt);
        for _ in 0..5 {
            engine.tick(&mut state);
        }
        let partway = state.right_trigger;
        assert!((partway - 0.35).abs() < 1e-9);

        engine.release(Trigger::Rt);
        engine.tick(&mut state);
        assert_eq!(state.right_trigger, partway - RAMP_STEP);
        assert!(state.right_trigger < partway);

        run_to_completion(&mut engine, &mut state, Trigger::Rt);
        assert_eq!(state.right_trigger, 0.0);
    }

    #[test]
    fn test_restart_cancels_previous_session() {
        let mut engine = RampEngine::default();

        let first = engine.press(Trigger::Lt);
        let second = engine.release(Trigger::Lt);
        assert_ne!(first, second);

        let session = engine.session(Trigger::Lt).unwrap();
        assert_eq!(session.token, second);
        assert_eq!(session.target, 0.0);
    }

    #[test]
    fn test_triggers_ramp_independently() {
        let mut engine = RampEngine::default();
        let mut state = ControllerState::new();

        engine.press(Trigger::Lt);
        engine.tick(&mut state);
        engine.press(Trigger::Rt);
        engine.tick(&mut state);

        assert_eq!(state.left_trigger, 0.14);
        assert_eq!(state.right_trigger, 0.07);

        engine.cancel(Trigger::Lt);
        engine.tick(&mut state);
        assert_eq!(state.left_trigger, 0.14);
        assert!((state.right_trigger - 0.14).abs() < 1e-12);
    }

    #[test]
    fn test_release_at_rest_ends_without_change() {
        let mut engine = RampEngine::default();
        let mut state = ControllerState::new();

        engine.release(Trigger::Lt);
        assert!(!engine.tick(&mut state));
        assert!(engine.is_idle());
        assert_eq!(state.left_trigger, 0.0);
    }
}
