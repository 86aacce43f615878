//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable                  | Default        |
//! |---------------------------|----------------|
//! | `LISTEN_ADDR`             | `0.0.0.0:8080` |
//! | `HEARTBEAT_INTERVAL_SECS` | `30`           |
//! | `IDLE_TIMEOUT_SECS`       | `120`          |
//! | `OUTBOUND_BUFFER`         | `256`          |
//! | `MAX_MESSAGE_BYTES`       | `65536`        |
//! | `LOG_FORMAT`              | `text`         |

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::RelayError;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Liveness settings applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    /// Time between server pings.
    pub interval: Duration,
    /// Silence after which the connection is closed.
    pub idle_timeout: Duration,
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Seconds between heartbeat pings.
    pub heartbeat_interval_secs: u64,

    /// Seconds of inbound silence before a connection is dropped.
    pub idle_timeout_secs: u64,

    /// Capacity of each connection's outbound queue.
    pub outbound_buffer: usize,

    /// Largest accepted WebSocket message, in bytes.
    pub max_message_bytes: usize,

    /// Tracing output format.
    pub log_format: LogFormat,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            heartbeat_interval_secs: 30,
            idle_timeout_secs: 120,
            outbound_buffer: 256,
            max_message_bytes: 64 * 1024,
            log_format: LogFormat::Text,
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `LISTEN_ADDR` cannot be parsed or
    /// the resulting settings are inconsistent.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Missing or unparsable numeric values fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `LISTEN_ADDR` is set but invalid,
    /// or [`RelayConfig::validate`] fails.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|e| RelayError::Config(format!("LISTEN_ADDR {raw:?}: {e}")))?,
            None => defaults.listen_addr,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let config = Self {
            listen_addr,
            heartbeat_interval_secs: parse_or(
                &lookup,
                "HEARTBEAT_INTERVAL_SECS",
                defaults.heartbeat_interval_secs,
            ),
            idle_timeout_secs: parse_or(&lookup, "IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
            outbound_buffer: parse_or(&lookup, "OUTBOUND_BUFFER", defaults.outbound_buffer),
            max_message_bytes: parse_or(&lookup, "MAX_MESSAGE_BYTES", defaults.max_message_bytes),
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if the heartbeat interval, outbound
    /// buffer or message size limit is zero, or the idle timeout is
    /// shorter than the heartbeat interval.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.heartbeat_interval_secs == 0 {
            return Err(RelayError::Config(
                "HEARTBEAT_INTERVAL_SECS must be positive".to_string(),
            ));
        }
        if self.idle_timeout_secs < self.heartbeat_interval_secs {
            return Err(RelayError::Config(format!(
                "IDLE_TIMEOUT_SECS ({}) must be at least HEARTBEAT_INTERVAL_SECS ({})",
                self.idle_timeout_secs, self.heartbeat_interval_secs
            )));
        }
        if self.outbound_buffer == 0 {
            return Err(RelayError::Config(
                "OUTBOUND_BUFFER must be positive".to_string(),
            ));
        }
        if self.max_message_bytes == 0 {
            return Err(RelayError::Config(
                "MAX_MESSAGE_BYTES must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Heartbeat settings for connection tasks.
    #[must_use]
    pub const fn heartbeat(&self) -> Heartbeat {
        Heartbeat {
            interval: Duration::from_secs(self.heartbeat_interval_secs),
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
        }
    }
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
