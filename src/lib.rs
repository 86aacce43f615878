//! # courier-relay
//!
//! Real-time location relay between courier driver clients and dispatch
//! monitors.
//!
//! Drivers and monitors open a WebSocket, declare a role and identifier
//! with an `auth` message, and from then on exchange JSON messages that
//! the relay routes between them: driver positions go to the monitors
//! subscribed to that driver, delivery assignments go to the assigned
//! driver, and every monitor is told which drivers are connected. All
//! state lives in memory for the lifetime of the process.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)
//!     │
//!     ├── WS Handler + connection tasks (ws/)
//!     │
//!     ├── RelayHub: mutex-guarded state + outbound queues (service/)
//!     ├── RelayState: pure message router (service/)
//!     │
//!     └── ConnectionRegistry, SubscriptionTable, AssignmentStore (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;
