//! WebSocket layer: upgrade handler, per-connection loop, wire messages.
//!
//! The relay accepts WebSocket upgrades at `/` and `/ws`. Each socket
//! exchanges JSON text frames described in [`messages`].

pub mod connection;
pub mod handler;
pub mod messages;
