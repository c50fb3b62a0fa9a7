//! # Padlink Library
//!
//! Turn a multi-touch screen into a virtual gamepad and stream it to a remote listener.
//!
//! This library provides the capture core: input tracking for buttons,
//! joysticks and analog triggers, a single aggregated controller state,
//! frame-aligned emission and a TCP transport to the listener.

pub mod config;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod runtime;
pub mod session;
pub mod transport;
