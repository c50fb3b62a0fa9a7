//! # Padlink
//!
//! Stream a multi-touch virtual gamepad to a remote listener.
//!
//! A touch front-end writes input events to this process as JSON lines on
//! stdin. Padlink tracks buttons, joysticks and analog triggers, keeps one
//! aggregated controller state and sends it to the listener over TCP at
//! most once per frame.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use padlink::config::{Config, LoggingConfig};
use padlink::feedback::LogFeedback;
use padlink::runtime::{self, forward_input_lines, RuntimeSettings};
use padlink::session::{CaptureSession, SessionOptions};
use padlink::transport::socket::{ConnectionPolicy, SocketTransport};

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Input events buffered between the stdin reader and the session
const INPUT_QUEUE: usize = 256;

/// File name prefix for the rolling log file
const LOG_FILE_PREFIX: &str = "padlink.log";

/// Main entry point for Padlink
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (`padlink [CONFIG]`, default `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Start the TCP transport to the listener
///
/// 2. **Main Loop**
///    - Apply input events read from stdin
///    - Advance trigger ramps and emit at most one snapshot per frame
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Flush the last pending snapshot
///    - Log session statistics
///
/// # Errors
///
/// Returns error if:
/// - The configuration file cannot be read or is invalid
/// - Logging cannot be initialized
///
/// # Examples
///
/// ```bash
/// touch-frontend | padlink config/living-room.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO padlink: Padlink v0.1.0 starting...
/// INFO padlink: Connecting to listener at 192.168.1.20:5000
/// INFO padlink::transport::socket: Connected to 192.168.1.20:5000
/// INFO padlink::session: Playing as P1
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let (config, source) = load_config(config_path)?;

    let log_guard = init_logging(&config.logging)?;

    info!("Padlink v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", source);

    let address = config.transport.address()?;
    info!("Connecting to listener at {}", address);
    let (transport, transport_events) = SocketTransport::spawn(
        address,
        ConnectionPolicy::from(&config.transport),
        config.transport.send_queue,
    );

    let feedback = LogFeedback::new(config.feedback.haptics);
    let mut session = CaptureSession::new(transport, feedback, SessionOptions::from(&config));

    let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE);
    let reader = tokio::spawn(async move {
        match forward_input_lines(tokio::io::stdin(), input_tx).await {
            Ok(count) => info!("Input stream ended after {} events", count),
            Err(e) => warn!("Input reader failed: {}", e),
        }
    });

    info!("Reading input events from stdin");
    info!("Press Ctrl+C to exit");

    let stats = runtime::run(
        &mut session,
        input_rx,
        transport_events,
        RuntimeSettings::from(&config),
        shutdown_signal(),
    )
    .await;

    info!(
        "Events: {} ({} state changes), snapshots sent: {}, coalesced: {}, offline: {}, dropped: {}",
        stats.events,
        stats.mutations,
        stats.emitter.transmissions,
        stats.emitter.coalesced,
        stats.emitter.offline_marks,
        stats.emitter.dropped_flushes,
    );

    drop(session);
    if !reader.is_finished() {
        // A blocked stdin read keeps the runtime from shutting down
        drop(log_guard);
        std::process::exit(0);
    }

    Ok(())
}

/// Loads the configuration and describes where it came from.
///
/// An explicit path must exist. Without one, `config/default.toml` is used
/// when present and built-in defaults otherwise.
fn load_config(path: Option<PathBuf>) -> Result<(Config, String)> {
    match path {
        Some(path) => {
            let config = Config::load(&path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            Ok((config, path.display().to_string()))
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            let config = Config::load(DEFAULT_CONFIG_PATH)
                .with_context(|| format!("failed to load configuration from {}", DEFAULT_CONFIG_PATH))?;
            Ok((config, DEFAULT_CONFIG_PATH.to_string()))
        }
        None => Ok((Config::default(), "built-in defaults".to_string())),
    }
}

/// Installs the tracing subscriber.
///
/// Logs go to stderr (stdout is left alone) and, when `file_dir` is set,
/// to a daily rolling file. The returned guard must be held until exit so
/// buffered file output is flushed.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: tracing::Level = config
        .level
        .parse()
        .with_context(|| format!("invalid log level '{}'", config.level))?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let console = fmt::layer().with_writer(std::io::stderr);

    match &config.file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .context("failed to install log subscriber")?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init()
                .context("failed to install log subscriber")?;
            Ok(None)
        }
    }
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
