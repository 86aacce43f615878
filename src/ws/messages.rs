//! Wire protocol: one JSON object per text frame, discriminated by `type`.
//!
//! ```json
//! {"type":"auth","role":"driver","driverId":"d1"}
//! {"type":"auth","role":"monitor","monitorId":"m1"}
//! {"type":"connected_drivers"}
//! {"type":"subscribe","monitorId":"m1","driverId":"d1"}
//! {"type":"location","driverId":"d1","coord":{"lat":3.85,"lng":11.51}}
//! {"type":"assign","driverId":"d1","delivery":"job-42"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::domain::{DeliveryRef, DriverId, Identity, MonitorId, Role};
use crate::error::RelayError;

/// `type` values the relay understands (plus the `suscribe` spelling
/// used by the dashboard client).
const KNOWN_TYPES: &[&str] = &[
    "auth",
    "connected_drivers",
    "subscribe",
    "suscribe",
    "location",
    "assign",
];

/// GPS fix reported by a driver.
///
/// `lat` and `lng` must be numbers. Both keep their original JSON
/// representation, and any other field the device adds (`accuracy`,
/// `heading`, `speed`, ...) is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    /// Latitude in decimal degrees.
    pub lat: Number,
    /// Longitude in decimal degrees.
    pub lng: Number,
    /// Device-specific extras.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of an `auth` message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    /// Declared role.
    pub role: Role,
    /// Identifier when `role` is `driver`.
    pub driver_id: Option<DriverId>,
    /// Identifier when `role` is `monitor`.
    pub monitor_id: Option<MonitorId>,
}

impl AuthRequest {
    /// Resolves the identifier field that matches the declared role.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MissingIdentifier`] if that field is absent.
    pub fn into_identity(self) -> Result<Identity, RelayError> {
        match self.role {
            Role::Driver => self
                .driver_id
                .map(Identity::Driver)
                .ok_or(RelayError::MissingIdentifier(Role::Driver)),
            Role::Monitor => self
                .monitor_id
                .map(Identity::Monitor)
                .ok_or(RelayError::MissingIdentifier(Role::Monitor)),
        }
    }
}

/// Body of a `subscribe` message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    /// Monitor that wants updates.
    pub monitor_id: MonitorId,
    /// Driver to watch.
    pub driver_id: DriverId,
}

/// Body of a `location` message; forwarded to monitors unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    /// Reporting driver.
    pub driver_id: DriverId,
    /// Position fix.
    pub coord: Coord,
    /// Device timestamp, passed through uninterpreted when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

/// Body of an `assign` message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    /// Driver receiving the job.
    pub driver_id: DriverId,
    /// Opaque job reference.
    pub delivery: DeliveryRef,
}

/// Client → server messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Declare role and identifier.
    Auth(AuthRequest),
    /// Ask for the ids of all connected drivers.
    ConnectedDrivers,
    /// Watch one driver.
    #[serde(alias = "suscribe")]
    Subscribe(SubscribeRequest),
    /// Position update from a driver.
    Location(LocationReport),
    /// Assign a delivery job to a driver.
    Assign(AssignRequest),
}

impl InboundMessage {
    /// Parses one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownType`] if the frame is a JSON object
    /// whose `type` the relay does not handle, and
    /// [`RelayError::Malformed`] for anything else that does not parse.
    pub fn parse(text: &str) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_str(text)?;
        if let Some(msg_type) = value.get("type").and_then(Value::as_str)
            && !KNOWN_TYPES.contains(&msg_type)
        {
            return Err(RelayError::UnknownType(msg_type.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Protocol name of this message, for logs and rejections.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::ConnectedDrivers => "connected_drivers",
            Self::Subscribe(_) => "subscribe",
            Self::Location(_) => "location",
            Self::Assign(_) => "assign",
        }
    }
}

/// Server → client messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Current list of registered driver ids.
    ConnectedDrivers {
        /// Driver ids in registration order.
        #[serde(rename = "connectedDrivers")]
        connected_drivers: Vec<DriverId>,
    },
    /// Forwarded driver position.
    Location(LocationReport),
    /// Full list of deliveries assigned to the receiving driver.
    Assign {
        /// Every delivery assigned so far, oldest first.
        deliveries: Vec<DeliveryRef>,
    },
}

impl OutboundMessage {
    /// Encodes the message as a JSON text frame payload.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if a delivery reference cannot be
    /// serialized.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
