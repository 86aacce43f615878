//! Identifiers for relay clients and their connections.
//!
//! [`DriverId`] and [`MonitorId`] are caller-supplied strings. They are
//! not validated for uniqueness or authenticity; wrapping them keeps a
//! driver identifier from being passed where a monitor identifier is
//! expected. [`ConnectionId`] is generated server-side for every socket.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Self-declared identifier of a driver client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(String);

impl DriverId {
    /// Wraps a raw identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DriverId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Self-declared identifier of a monitor (dispatch dashboard) client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorId(String);

impl MonitorId {
    /// Wraps a raw identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MonitorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Server-generated identity of one transport-level socket.
///
/// Wraps a UUID v4 minted when the socket is accepted. The registry
/// stores this id rather than the socket itself, so a stale id simply
/// fails to resolve once the socket is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role a client declares in its `auth` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Courier or vehicle reporting its position.
    Driver,
    /// Dispatch dashboard observing drivers.
    Monitor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver => f.write_str("driver"),
            Self::Monitor => f.write_str("monitor"),
        }
    }
}

/// A role bound to its declared identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Authenticated as a driver.
    Driver(DriverId),
    /// Authenticated as a monitor.
    Monitor(MonitorId),
}

impl Identity {
    /// Returns the role half of this identity.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Driver(_) => Role::Driver,
            Self::Monitor(_) => Role::Monitor,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver(id) => write!(f, "driver:{id}"),
            Self::Monitor(id) => write!(f, "monitor:{id}"),
        }
    }
}
