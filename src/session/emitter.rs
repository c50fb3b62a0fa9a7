//! # Emission Scheduler
//!
//! Coalesces state mutations into at most one transmission per frame.
//!
//! The first dirty mark after an emission arms a single pending flush. Any
//! further marks before the next frame are absorbed by it. When the frame
//! fires, the full current snapshot is sent (never a delta) and the flush is
//! disarmed. While the transport is down, marks do not arm a flush at all,
//! so nothing accumulates; the first mark after reconnecting sends the
//! state as it is then.

use tracing::debug;

use crate::controller::state::ControllerState;
use crate::transport::Transport;

/// Counters describing emitter activity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitterStats {
    /// Snapshots handed to the transport.
    pub transmissions: u64,
    /// Dirty marks absorbed into an already pending flush.
    pub coalesced: u64,
    /// Dirty marks made while the transport was down.
    pub offline_marks: u64,
    /// Pending flushes dropped because the link went down before the frame.
    pub dropped_flushes: u64,
}

/// Dirty flag plus single pending-flush token.
#[derive(Debug, Default, Clone)]
pub struct Emitter {
    pending: bool,
    stats: EmitterStats,
}

impl Emitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the state changed.
    ///
    /// Returns `true` if this mark armed a new flush, i.e. the caller should
    /// request a frame.
    pub fn mark_dirty(&mut self, connected: bool) -> bool {
        if !connected {
            self.stats.offline_marks += 1;
            return false;
        }
        if self.pending {
            self.stats.coalesced += 1;
            return false;
        }
        self.pending = true;
        true
    }

    /// Whether a flush is armed for the next frame.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Frame callback: sends the snapshot if a flush is armed.
    ///
    /// Returns `true` if a snapshot was handed to the transport.
    pub fn flush<T: Transport>(&mut self, state: &ControllerState, transport: &mut T) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;

        if !transport.is_connected() {
            self.stats.dropped_flushes += 1;
            debug!("Transport down, dropping pending snapshot");
            return false;
        }

        transport.send(state);
        self.stats.transmissions += 1;
        true
    }

    #[must_use]
    pub fn stats(&self) -> EmitterStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::state::Button;
    use crate::transport::mocks::RecordingTransport;

    #[test]
    fn test_first_mark_arms_flush() {
        let mut emitter = Emitter::new();
        assert!(!emitter.is_pending());
        assert!(emitter.mark_dirty(true));
        assert!(emitter.is_pending());
    }

    #[test]
    fn test_marks_coalesce_into_one_flush() {
        let mut emitter = Emitter::new();
        let mut transport = RecordingTransport::connected();
        let state = ControllerState::new();

        assert!(emitter.mark_dirty(true));
        for _ in 0..9 {
            assert!(!emitter.mark_dirty(true));
        }

        assert!(emitter.flush(&state, &mut transport));
        assert!(!emitter.flush(&state, &mut transport));
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(emitter.stats().coalesced, 9);
        assert_eq!(emitter.stats().transmissions, 1);
    }

    #[test]
    fn test_flush_sends_current_state() {
        let mut emitter = Emitter::new();
        let mut transport = RecordingTransport::connected();
        let mut state = ControllerState::new();

        emitter.mark_dirty(true);
        state.set_button(Button::A, true);
        state.set_button(Button::A, false);
        emitter.flush(&state, &mut transport);

        assert_eq!(transport.sent(), vec![state]);
    }

    #[test]
    fn test_offline_marks_do_not_arm() {
        let mut emitter = Emitter::new();
        let mut transport = RecordingTransport::disconnected();

        assert!(!emitter.mark_dirty(false));
        assert!(!emitter.mark_dirty(false));
        assert!(!emitter.flush(&ControllerState::new(), &mut transport));
        assert!(transport.sent().is_empty());
        assert_eq!(emitter.stats().offline_marks, 2);
    }

    #[test]
    fn test_pending_flush_dropped_when_link_goes_down() {
        let mut emitter = Emitter::new();
        let mut transport = RecordingTransport::connected();

        emitter.mark_dirty(true);
        transport.set_connected(false);

        assert!(!emitter.flush(&ControllerState::new(), &mut transport));
        assert!(!emitter.is_pending());
        assert!(transport.sent().is_empty());
        assert_eq!(emitter.stats().dropped_flushes, 1);
    }
}
