//! # Controller Module
//!
//! Virtual gamepad model and the trackers that mutate it.
//!
//! This module handles:
//! - The aggregated controller snapshot ([`state`])
//! - Modality-agnostic input events ([`input`])
//! - Digital buttons with idempotent press/release ([`buttons`])
//! - Joysticks with exclusive pointer binding and circular clamping ([`joystick`])
//! - Digital-to-analog trigger ramps ([`ramp`])

pub mod buttons;
pub mod input;
pub mod joystick;
pub mod ramp;
pub mod state;
