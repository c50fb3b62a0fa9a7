//! # Transport Module
//!
//! The connection to the remote listener, seen from the capture core.
//!
//! The core only needs to know whether the link is up and to hand over a
//! snapshot. Delivery is fire-and-forget: there is no acknowledgment, and a
//! snapshot that cannot be sent is dropped.
//!
//! This module handles:
//! - The [`Transport`] trait used by the capture session
//! - Lifecycle notifications ([`TransportEvent`])
//! - Newline-delimited JSON wire codec ([`codec`])
//! - A tokio TCP client with reconnection ([`socket`])

pub mod codec;
pub mod socket;

use crate::controller::state::ControllerState;

/// Outbound side of the connection to the remote listener.
pub trait Transport {
    /// Whether a connection is currently established.
    fn is_connected(&self) -> bool;

    /// Sends a full snapshot. Never blocks and never fails; a snapshot that
    /// cannot be delivered is dropped.
    fn send(&mut self, state: &ControllerState);
}

/// Lifecycle notifications from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established.
    Connected,
    /// Connection lost.
    Disconnected,
    /// Listener assigned a player number (display only).
    PlayerId(u32),
    /// Listener reported an error (e.g. no free player slot).
    ServerError(String),
    /// A connection attempt failed.
    ConnectFailed(String),
}
