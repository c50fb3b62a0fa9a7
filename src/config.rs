//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section is optional and falls back to its defaults, so a file
//! containing only `[transport] host = "..."` is a complete configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::controller::input::Point;
use crate::controller::joystick::JoystickZone;
use crate::error::{PadlinkError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub ramp: RampConfig,
    #[serde(default)]
    pub joystick: JoystickConfig,
    #[serde(default)]
    pub emitter: EmitterConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener connection configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Snapshots that may wait for the socket before new ones are dropped.
    #[serde(default = "default_send_queue")]
    pub send_queue: usize,
}

/// Trigger ramp configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RampConfig {
    #[serde(default = "default_ramp_step")]
    pub step: f64,

    #[serde(default = "default_ramp_tick_ms")]
    pub tick_ms: u64,
}

/// Joystick geometry
#[derive(Debug, Deserialize, Clone)]
pub struct JoystickConfig {
    #[serde(default = "default_radius_fraction")]
    pub radius_fraction: f64,

    #[serde(default = "default_left_zone")]
    pub left: ZoneConfig,

    #[serde(default = "default_right_zone")]
    pub right: ZoneConfig,
}

/// On-screen joystick zone
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ZoneConfig {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
}

/// Emission scheduler configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EmitterConfig {
    #[serde(default = "default_frame_rate_hz")]
    pub frame_rate_hz: u32,
}

/// User feedback configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FeedbackConfig {
    #[serde(default = "default_haptics")]
    pub haptics: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily-rolling log file. Console only when unset.
    #[serde(default)]
    pub file_dir: Option<String>,
}

// Default value functions
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }
fn default_connect_timeout_ms() -> u64 { 5000 }
fn default_reconnect_attempts() -> u32 { 3 }
fn default_reconnect_delay_ms() -> u64 { 1000 }
fn default_send_queue() -> usize { 4 }

fn default_ramp_step() -> f64 { 0.07 }
fn default_ramp_tick_ms() -> u64 { 16 }

fn default_radius_fraction() -> f64 { 0.4 }
fn default_left_zone() -> ZoneConfig { ZoneConfig { center_x: 180.0, center_y: 420.0, width: 180.0 } }
fn default_right_zone() -> ZoneConfig { ZoneConfig { center_x: 620.0, center_y: 420.0, width: 180.0 } }

fn default_frame_rate_hz() -> u32 { 60 }

fn default_haptics() -> bool { true }

fn default_log_level() -> String { "info".to_string() }

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            send_queue: default_send_queue(),
        }
    }
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            step: default_ramp_step(),
            tick_ms: default_ramp_tick_ms(),
        }
    }
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            radius_fraction: default_radius_fraction(),
            left: default_left_zone(),
            right: default_right_zone(),
        }
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: default_frame_rate_hz(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            haptics: default_haptics(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_dir: None,
        }
    }
}

impl TransportConfig {
    /// `host:port` string for the listener. IPv6 literals are bracketed.
    ///
    /// # Errors
    ///
    /// Returns [`PadlinkError::InvalidAddress`] if the host is empty or
    /// contains whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use padlink::config::TransportConfig;
    ///
    /// let mut transport = TransportConfig::default();
    /// transport.host = "::1".to_string();
    /// assert_eq!(transport.address()?, "[::1]:5000");
    /// # Ok::<(), padlink::error::PadlinkError>(())
    /// ```
    pub fn address(&self) -> Result<String> {
        let host = self.host.trim();
        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(PadlinkError::InvalidAddress(self.host.clone()));
        }
        if host.contains(':') && !host.starts_with('[') {
            Ok(format!("[{}]:{}", host, self.port))
        } else {
            Ok(format!("{}:{}", host, self.port))
        }
    }
}

impl RampConfig {
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl ZoneConfig {
    #[must_use]
    pub fn zone(&self) -> JoystickZone {
        JoystickZone::new(Point::new(self.center_x, self.center_y), self.width)
    }
}

impl EmitterConfig {
    /// Time between frame callbacks.
    #[must_use]
    pub fn frame_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.frame_rate_hz.max(1)))
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use padlink::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Transport
        if self.transport.address().is_err() {
            return Err(invalid("transport host cannot be empty or contain whitespace"));
        }

        if self.transport.port == 0 {
            return Err(invalid("port must be non-zero"));
        }

        if self.transport.connect_timeout_ms == 0 || self.transport.connect_timeout_ms > 60000 {
            return Err(invalid("connect_timeout_ms must be between 1 and 60000"));
        }

        if self.transport.reconnect_attempts > 100 {
            return Err(invalid("reconnect_attempts must be at most 100"));
        }

        if self.transport.reconnect_delay_ms == 0 || self.transport.reconnect_delay_ms > 60000 {
            return Err(invalid("reconnect_delay_ms must be between 1 and 60000"));
        }

        if self.transport.send_queue == 0 || self.transport.send_queue > 1024 {
            return Err(invalid("send_queue must be between 1 and 1024"));
        }

        // Ramp
        if !(self.ramp.step > 0.0 && self.ramp.step <= 1.0) {
            return Err(invalid("ramp step must be in (0.0, 1.0]"));
        }

        if self.ramp.tick_ms == 0 || self.ramp.tick_ms > 1000 {
            return Err(invalid("ramp tick_ms must be between 1 and 1000"));
        }

        // Joystick geometry
        if !(self.joystick.radius_fraction > 0.0 && self.joystick.radius_fraction <= 1.0) {
            return Err(invalid("radius_fraction must be in (0.0, 1.0]"));
        }

        for (name, zone) in [("left", &self.joystick.left), ("right", &self.joystick.right)] {
            if !zone.center_x.is_finite() || !zone.center_y.is_finite() {
                return Err(invalid(format!("joystick.{} center must be finite", name)));
            }
            if !(zone.width.is_finite() && zone.width > 0.0) {
                return Err(invalid(format!("joystick.{} width must be greater than 0", name)));
            }
        }

        // Emitter
        if self.emitter.frame_rate_hz == 0 || self.emitter.frame_rate_hz > 240 {
            return Err(invalid("frame_rate_hz must be between 1 and 240"));
        }

        // Logging
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(format!(
                "log level '{}' must be one of: trace, debug, info, warn, error",
                self.logging.level
            )));
        }

        if matches!(&self.logging.file_dir, Some(dir) if dir.is_empty()) {
            return Err(invalid("logging file_dir cannot be empty when set"));
        }

        Ok(())
    }
}

fn invalid(message: impl std::fmt::Display) -> PadlinkError {
    PadlinkError::Config(toml::de::Error::custom(message))
}
