//! Per-connection read/write loop.
//!
//! Each socket is driven by one task that multiplexes three sources:
//! inbound frames (applied to the hub one at a time, in arrival order),
//! the connection's outbound queue, and a heartbeat timer that pings the
//! client and closes the socket once it has been silent for too long.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::config::Heartbeat;
use crate::service::RelayHub;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Text frames are handed to [`RelayHub::handle_text`] and fully applied
///   before the next frame is read.
/// - Messages queued for this connection are encoded and written.
/// - Every `heartbeat.interval` a ping is sent; if nothing has been
///   received for `heartbeat.idle_timeout` the connection is closed.
///
/// On exit the connection is detached from the hub, which runs the
/// registry close path.
pub async fn run_connection(socket: WebSocket, hub: Arc<RelayHub>, heartbeat: Heartbeat) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (mut session, mut outbound_rx) = hub.attach().await;

    let mut ping = interval_at(Instant::now() + heartbeat.interval, heartbeat.interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        last_seen = Instant::now();
                        hub.handle_text(&mut session, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(data))) => {
                        last_seen = Instant::now();
                        tracing::debug!(
                            connection_id = %session.id(),
                            len = data.len(),
                            "binary frame ignored"
                        );
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => last_seen = Instant::now(),
                    Some(Err(e)) => {
                        tracing::debug!(
                            connection_id = %session.id(),
                            error = %e,
                            "ws receive error"
                        );
                        break;
                    }
                }
            }
            // Message routed to this connection
            Some(outbound) = outbound_rx.recv() => {
                match outbound.to_json() {
                    Ok(json) => {
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            connection_id = %session.id(),
                            error = %e,
                            "failed to encode outbound message"
                        );
                    }
                }
            }
            _ = ping.tick() => {
                if last_seen.elapsed() >= heartbeat.idle_timeout {
                    tracing::info!(
                        connection_id = %session.id(),
                        "idle timeout reached, closing connection"
                    );
                    break;
                }
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    hub.detach(&mut session).await;
    let _ = ws_tx.close().await;
    tracing::debug!(connection_id = %session.id(), "ws connection closed");
}
