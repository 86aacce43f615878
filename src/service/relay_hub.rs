//! Relay coordinator: shared state plus the outbound side of every socket.
//!
//! [`RelayHub`] owns the [`RelayState`] behind a single mutex and a table
//! of [`Outlet`]s, one bounded channel per live connection. Every inbound
//! text frame follows the pattern: parse → lock state → route → push
//! deliveries to outlets → release lock. Pushing is non-blocking, so the
//! lock is never held across socket I/O.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock, mpsc};

use super::router::{Delivery, RelayCounts, RelayState};
use crate::domain::{ConnectionId, Session};
use crate::error::RelayError;
use crate::ws::messages::{InboundMessage, OutboundMessage};

/// Sending half of one connection's outbound queue.
#[derive(Debug, Clone)]
pub struct Outlet {
    tx: mpsc::Sender<OutboundMessage>,
    attached_at: DateTime<Utc>,
}

impl Outlet {
    /// Returns `true` while the connection's writer is still draining.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// When the connection was attached to the hub.
    #[must_use]
    pub const fn attached_at(&self) -> DateTime<Utc> {
        self.attached_at
    }
}

/// Result of pushing a batch of deliveries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Messages queued on an open outlet.
    pub queued: usize,
    /// Targets that were closed or already detached.
    pub skipped: usize,
    /// Messages dropped because the target's queue was full.
    pub dropped: usize,
}

/// Occupancy figures for the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    /// Attached sockets, authenticated or not.
    pub connections: usize,
    /// Registered drivers.
    pub drivers: usize,
    /// Registered monitors.
    pub monitors: usize,
    /// Monitors with a subscription.
    pub subscriptions: usize,
}

/// Shared coordinator for all connection tasks.
#[derive(Debug)]
pub struct RelayHub {
    state: Mutex<RelayState>,
    outlets: RwLock<HashMap<ConnectionId, Outlet>>,
    outbound_capacity: usize,
}

impl RelayHub {
    /// Creates a hub whose per-connection queues hold `outbound_capacity`
    /// messages.
    #[must_use]
    pub fn new(outbound_capacity: usize) -> Self {
        Self {
            state: Mutex::new(RelayState::new()),
            outlets: RwLock::new(HashMap::new()),
            outbound_capacity: outbound_capacity.max(1),
        }
    }

    /// Attaches a freshly accepted socket.
    ///
    /// Returns its unauthenticated [`Session`] and the receiving half of
    /// its outbound queue, which the connection task drains to the socket.
    pub async fn attach(&self) -> (Session, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.outbound_capacity);
        let session = Session::new(ConnectionId::new());
        let outlet = Outlet {
            tx,
            attached_at: Utc::now(),
        };
        self.outlets.write().await.insert(session.id(), outlet);
        tracing::debug!(connection_id = %session.id(), "connection attached");
        (session, rx)
    }

    /// Handles one text frame from `session`'s socket.
    ///
    /// Rejected or malformed frames are logged and dropped; the connection
    /// stays open.
    pub async fn handle_text(&self, session: &mut Session, text: &str) -> DispatchReport {
        let message = match InboundMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                log_rejection(session, &e);
                return DispatchReport::default();
            }
        };
        self.handle_message(session, message).await
    }

    /// Applies an already-parsed message from `session`.
    pub async fn handle_message(
        &self,
        session: &mut Session,
        message: InboundMessage,
    ) -> DispatchReport {
        let mut state = self.state.lock().await;
        match state.handle(session, message) {
            Ok(deliveries) => self.dispatch(deliveries).await,
            Err(e) => {
                log_rejection(session, &e);
                DispatchReport::default()
            }
        }
    }

    /// Detaches `session`'s socket and runs the close path.
    pub async fn detach(&self, session: &mut Session) -> DispatchReport {
        if let Some(outlet) = self.outlets.write().await.remove(&session.id()) {
            let lifetime = Utc::now() - outlet.attached_at();
            tracing::debug!(
                connection_id = %session.id(),
                secs = lifetime.num_seconds(),
                "connection detached"
            );
        }
        let mut state = self.state.lock().await;
        let deliveries = state.close(session);
        self.dispatch(deliveries).await
    }

    /// Pushes deliveries to their outlets, skipping closed targets.
    pub async fn dispatch(&self, deliveries: Vec<Delivery>) -> DispatchReport {
        let mut report = DispatchReport::default();
        if deliveries.is_empty() {
            return report;
        }

        let outlets = self.outlets.read().await;
        for Delivery { to, message } in deliveries {
            let Some(outlet) = outlets.get(&to).filter(|o| o.is_open()) else {
                tracing::debug!(connection_id = %to, "target closed; delivery skipped");
                report.skipped += 1;
                continue;
            };
            match outlet.tx.try_send(message) {
                Ok(()) => report.queued += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(connection_id = %to, "outbound queue full; delivery dropped");
                    report.dropped += 1;
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Current occupancy.
    pub async fn stats(&self) -> RelayStats {
        let connections = self.outlets.read().await.len();
        let RelayCounts {
            drivers,
            monitors,
            subscriptions,
        } = self.state.lock().await.counts();
        RelayStats {
            connections,
            drivers,
            monitors,
            subscriptions,
        }
    }
}

fn log_rejection(session: &Session, error: &RelayError) {
    match error {
        RelayError::UnknownType(_) => {
            tracing::info!(
                connection_id = %session.id(),
                kind = error.kind(),
                %error,
                "message ignored"
            );
        }
        _ => {
            tracing::warn!(
                connection_id = %session.id(),
                kind = error.kind(),
                %error,
                "message rejected"
            );
        }
    }
}
