//! # Runtime Module
//!
//! Drives a [`CaptureSession`] from async sources.
//!
//! One task owns the session and multiplexes everything that touches it:
//!
//! | Source              | Action                                  |
//! |---------------------|-----------------------------------------|
//! | input channel       | [`CaptureSession::handle`]              |
//! | transport events    | [`CaptureSession::on_transport_event`]  |
//! | ramp interval       | [`CaptureSession::tick_ramps`]          |
//! | frame interval      | [`CaptureSession::frame`]               |
//! | shutdown future     | final flush, then return                |
//!
//! Because only this task mutates the state, a frame always sees a
//! consistent snapshot.

use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::controller::input::InputEvent;
use crate::controller::ramp::RAMP_TICK_MS;
use crate::error::Result;
use crate::feedback::Feedback;
use crate::session::{CaptureSession, SessionStats};
use crate::transport::{Transport, TransportEvent};

/// Number of transmitted frames between status log messages
const STATUS_LOG_FRAMES: u64 = 3600;

/// Timer periods for the runtime loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub ramp_tick: Duration,
    pub frame_period: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            ramp_tick: Duration::from_millis(RAMP_TICK_MS),
            frame_period: Duration::from_micros(16_666),
        }
    }
}

impl From<&Config> for RuntimeSettings {
    fn from(config: &Config) -> Self {
        Self {
            ramp_tick: config.ramp.tick(),
            frame_period: config.emitter.frame_period(),
        }
    }
}

/// Runs the session until the input stream ends or `shutdown` resolves.
///
/// When the transport stops publishing events (it gave up reconnecting),
/// the session keeps tracking input locally.
///
/// Returns the session statistics after a final frame flush.
pub async fn run<T, F, S>(
    session: &mut CaptureSession<T, F>,
    mut inputs: mpsc::Receiver<InputEvent>,
    mut transport_events: mpsc::UnboundedReceiver<TransportEvent>,
    settings: RuntimeSettings,
    shutdown: S,
) -> SessionStats
where
    T: Transport,
    F: Feedback,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut ramp_interval = interval(settings.ramp_tick);
    ramp_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frame_interval = interval(settings.frame_period);
    frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut events_open = true;
    let mut last_log_transmissions: u64 = 0;

    info!(
        "Session running (ramp tick {:?}, frame period {:?})",
        settings.ramp_tick, settings.frame_period
    );

    loop {
        tokio::select! {
            maybe_event = inputs.recv() => {
                let Some(event) = maybe_event else {
                    info!("Input stream closed");
                    break;
                };
                let ramps_were_idle = session.ramps_idle();
                session.handle(event);
                // First tick of a fresh ramp lands one full period after the press
                if ramps_were_idle && !session.ramps_idle() {
                    ramp_interval.reset();
                }
            }

            maybe_event = transport_events.recv(), if events_open => {
                match maybe_event {
                    Some(event) => session.on_transport_event(event),
                    None => {
                        warn!("Transport stopped, continuing without a listener");
                        events_open = false;
                    }
                }
            }

            _ = ramp_interval.tick(), if !session.ramps_idle() => {
                session.tick_ramps();
            }

            _ = frame_interval.tick() => {
                if session.frame() {
                    let transmissions = session.stats().emitter.transmissions;
                    if transmissions - last_log_transmissions >= STATUS_LOG_FRAMES {
                        info!("Sent {} snapshots", transmissions);
                        last_log_transmissions = transmissions;
                    }
                }
            }

            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    session.frame();
    session.stats()
}

/// Reads one JSON [`InputEvent`] per line and forwards it to `events`.
///
/// Blank lines are ignored and malformed lines are logged and skipped.
/// Stops at end of input or when the receiving side is gone.
///
/// Returns the number of events forwarded.
pub async fn forward_input_lines<R>(reader: R, events: mpsc::Sender<InputEvent>) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut forwarded = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<InputEvent>(line) {
            Ok(event) => {
                if events.send(event).await.is_err() {
                    debug!("Session closed, stopping input reader");
                    break;
                }
                forwarded += 1;
            }
            Err(e) => warn!("Skipping malformed input line: {}", e),
        }
    }

    Ok(forwarded)
}
