//! # Socket Transport
//!
//! TCP client for the remote listener.
//!
//! A background task owns the socket. It connects with a timeout, retries a
//! bounded number of times, writes encoded snapshots handed over by
//! [`SocketTransport::send`] and turns inbound lines into
//! [`TransportEvent`]s. The capture session never waits on the network:
//! `send` only pushes onto a small bounded queue and drops the snapshot when
//! the queue is full.

use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::codec::{decode_line, encode_input, Inbound};
use super::{Transport, TransportEvent};
use crate::config::TransportConfig;
use crate::controller::state::ControllerState;
use crate::error::{PadlinkError, Result};

/// Connect / reconnect behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionPolicy {
    /// Give up on a single attempt after this long.
    pub connect_timeout: Duration,
    /// Consecutive failed attempts allowed after the first one.
    pub reconnect_attempts: u32,
    /// Pause between attempts.
    pub reconnect_delay: Duration,
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(5000),
            reconnect_attempts: 3,
            reconnect_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&TransportConfig> for ConnectionPolicy {
    fn from(config: &TransportConfig) -> Self {
        Self {
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            reconnect_attempts: config.reconnect_attempts,
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
        }
    }
}

/// How a live connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionEnd {
    /// The listener closed the stream.
    Closed,
    /// The transport handle was dropped.
    Shutdown,
}

/// TCP transport to the remote listener.
pub struct SocketTransport {
    address: String,
    outbound: mpsc::Sender<Bytes>,
    connected: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for SocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketTransport")
            .field("address", &self.address)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl SocketTransport {
    /// Starts the connection task for `address` (`host:port`).
    ///
    /// Must be called from within a tokio runtime. Returns the transport and
    /// the receiver for its lifecycle events. The receiver closes when the
    /// task gives up reconnecting.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use padlink::transport::socket::{ConnectionPolicy, SocketTransport};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let (transport, mut events) =
    ///         SocketTransport::spawn("192.168.1.20:5000", ConnectionPolicy::default(), 4);
    ///     while let Some(event) = events.recv().await {
    ///         println!("{:?}", event);
    ///     }
    ///     drop(transport);
    /// }
    /// ```
    pub fn spawn(
        address: impl Into<String>,
        policy: ConnectionPolicy,
        queue: usize,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let address = address.into();
        let (outbound_tx, outbound_rx) = mpsc::channel(queue.max(1));
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(connection_task(
            address.clone(),
            policy,
            outbound_rx,
            Arc::clone(&connected),
            events_tx,
        ));

        (
            Self {
                address,
                outbound: outbound_tx,
                connected,
                task,
            },
            events_rx,
        )
    }

    /// Listener address this transport connects to.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Transport for SocketTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn send(&mut self, state: &ControllerState) {
        let frame = match encode_input(state) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode snapshot: {}", e);
                return;
            }
        };

        if let Err(e) = self.outbound.try_send(frame) {
            debug!("Dropped snapshot: {}", e);
        }
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Opens a TCP connection, bounded by `timeout`.
async fn connect(address: &str, timeout: Duration) -> Result<TcpStream> {
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(stream)) => {
            stream.set_nodelay(true)?;
            Ok(stream)
        }
        Ok(Err(e)) => Err(PadlinkError::Connection(format!(
            "Cannot reach {}: {}",
            address, e
        ))),
        Err(_) => Err(PadlinkError::Connection(format!(
            "Timed out connecting to {} after {}ms",
            address,
            timeout.as_millis()
        ))),
    }
}

async fn connection_task(
    address: String,
    policy: ConnectionPolicy,
    mut outbound: mpsc::Receiver<Bytes>,
    connected: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut failures: u32 = 0;

    loop {
        debug!("Connecting to {}", address);

        match connect(&address, policy.connect_timeout).await {
            Ok(stream) => {
                failures = 0;

                // Anything queued before the link came up is stale
                while outbound.try_recv().is_ok() {}

                connected.store(true, Ordering::Release);
                info!("Connected to {}", address);
                let _ = events.send(TransportEvent::Connected);

                let outcome = run_connection(stream, &mut outbound, &events).await;

                connected.store(false, Ordering::Release);
                let _ = events.send(TransportEvent::Disconnected);

                match outcome {
                    Ok(ConnectionEnd::Shutdown) => {
                        info!("Transport shut down");
                        return;
                    }
                    Ok(ConnectionEnd::Closed) => info!("Listener at {} closed the connection", address),
                    Err(e) => warn!("Connection to {} lost: {}", address, e),
                }
            }
            Err(e) => {
                warn!("{}", e);
                let _ = events.send(TransportEvent::ConnectFailed(e.to_string()));

                failures += 1;
                if failures > policy.reconnect_attempts {
                    warn!("Giving up on {} after {} attempts", address, failures);
                    return;
                }
            }
        }

        tokio::time::sleep(policy.reconnect_delay).await;
    }
}

/// Pumps one established connection until either side closes it.
async fn run_connection<S>(
    stream: S,
    outbound: &mut mpsc::Receiver<Bytes>,
    events: &mpsc::UnboundedSender<TransportEvent>,
) -> Result<ConnectionEnd>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();

    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    writer.write_all(&frame).await?;
                    writer.flush().await?;
                }
                None => return Ok(ConnectionEnd::Shutdown),
            },
            line = lines.next_line() => match line? {
                Some(line) => handle_inbound(&line, events),
                None => return Ok(ConnectionEnd::Closed),
            },
        }
    }
}

fn handle_inbound(line: &str, events: &mpsc::UnboundedSender<TransportEvent>) {
    if line.trim().is_empty() {
        return;
    }

    match decode_line(line) {
        Ok(Inbound::PlayerId(id)) => {
            info!("Assigned player {}", id);
            let _ = events.send(TransportEvent::PlayerId(id));
        }
        Ok(Inbound::Error(message)) => {
            warn!("Listener error: {}", message);
            let _ = events.send(TransportEvent::ServerError(message));
        }
        Err(e) => warn!("Ignoring inbound line: {}", e),
    }
}
