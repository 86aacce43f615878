//! Domain layer: identifiers, connection sessions, and the relay tables.
//!
//! This module contains the server-side model: who is connected under
//! which identifier, which monitor watches which driver, and which
//! deliveries have been assigned to each driver. None of it is persisted.

pub mod assignment_store;
pub mod client_id;
pub mod connection_registry;
pub mod session;
pub mod subscription_table;

pub use assignment_store::{AssignmentStore, DeliveryRef};
pub use client_id::{ConnectionId, DriverId, Identity, MonitorId, Role};
pub use connection_registry::ConnectionRegistry;
pub use session::{Session, SessionState};
pub use subscription_table::SubscriptionTable;
