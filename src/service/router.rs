//! Message routing as a pure state transition.
//!
//! [`RelayState`] owns the three relay tables. Each inbound message is
//! applied with [`RelayState::handle`], which mutates the tables and
//! returns the [`Delivery`] list the transport should attempt. Nothing
//! here touches a socket, so every protocol rule is testable in-process.

use crate::domain::{
    AssignmentStore, ConnectionId, ConnectionRegistry, DriverId, Identity, MonitorId, Session,
    SubscriptionTable,
};
use crate::error::RelayError;
use crate::ws::messages::{
    AssignRequest, InboundMessage, LocationReport, OutboundMessage, SubscribeRequest,
};

/// An outbound message addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Target connection.
    pub to: ConnectionId,
    /// Message to send.
    pub message: OutboundMessage,
}

/// Snapshot of table sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayCounts {
    /// Registered drivers.
    pub drivers: usize,
    /// Registered monitors.
    pub monitors: usize,
    /// Monitors with a subscription.
    pub subscriptions: usize,
}

/// Registry, subscriptions, and assignments for the whole relay.
#[derive(Debug, Default)]
pub struct RelayState {
    registry: ConnectionRegistry,
    subscriptions: SubscriptionTable,
    assignments: AssignmentStore,
}

impl RelayState {
    /// Creates empty relay state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the connection registry.
    #[must_use]
    pub const fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Read access to the subscription table.
    #[must_use]
    pub const fn subscriptions(&self) -> &SubscriptionTable {
        &self.subscriptions
    }

    /// Read access to the assignment store.
    #[must_use]
    pub const fn assignments(&self) -> &AssignmentStore {
        &self.assignments
    }

    /// Current table sizes.
    #[must_use]
    pub fn counts(&self) -> RelayCounts {
        RelayCounts {
            drivers: self.registry.driver_count(),
            monitors: self.registry.monitor_count(),
            subscriptions: self.subscriptions.len(),
        }
    }

    /// Applies one inbound message from `session`'s connection.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError`] when the message is rejected: anything but
    /// `auth` before authentication, a conflicting second `auth`, a message
    /// type the session's role may not send, or an identifier that does
    /// not match the session. Rejected messages leave the state untouched.
    pub fn handle(
        &mut self,
        session: &mut Session,
        message: InboundMessage,
    ) -> Result<Vec<Delivery>, RelayError> {
        let message_type = message.type_name();
        match message {
            InboundMessage::Auth(auth) => {
                let identity = auth.into_identity()?;
                session.authenticate(identity.clone())?;
                Ok(self.register(&identity, session.id()))
            }
            InboundMessage::ConnectedDrivers => {
                session.require_identity(message_type)?;
                Ok(vec![Delivery {
                    to: session.id(),
                    message: self.connected_drivers(),
                }])
            }
            InboundMessage::Subscribe(request) => {
                let monitor = Self::require_monitor(session, message_type)?;
                self.subscribe(monitor, request)?;
                Ok(Vec::new())
            }
            InboundMessage::Location(report) => {
                let driver = Self::require_driver(session, message_type)?;
                if *driver != report.driver_id {
                    return Err(RelayError::IdentityMismatch {
                        message_type,
                        claimed: report.driver_id.to_string(),
                        session: Identity::Driver(driver.clone()),
                    });
                }
                Ok(self.forward_location(report))
            }
            InboundMessage::Assign(request) => {
                session.require_identity(message_type)?;
                Ok(self.assign(request))
            }
        }
    }

    /// Runs the close path for `session` and marks it closed.
    ///
    /// Registry removal is guarded: an entry that a newer connection took
    /// over is left alone. Driver departures re-broadcast the driver list.
    /// Subscriptions and assignments are kept.
    pub fn close(&mut self, session: &mut Session) -> Vec<Delivery> {
        let conn = session.id();
        let Some(identity) = session.close() else {
            return Vec::new();
        };

        let removed = self.registry.unregister(&identity, conn);
        tracing::info!(%identity, connection_id = %conn, removed, "client disconnected");

        match identity {
            Identity::Driver(_) => self.broadcast_connected_drivers(),
            Identity::Monitor(_) => Vec::new(),
        }
    }

    fn register(&mut self, identity: &Identity, conn: ConnectionId) -> Vec<Delivery> {
        match self.registry.register(identity, conn) {
            Some(previous) if previous != conn => {
                tracing::info!(
                    %identity,
                    connection_id = %conn,
                    superseded = %previous,
                    "registration replaced"
                );
            }
            _ => tracing::info!(%identity, connection_id = %conn, "client registered"),
        }
        self.broadcast_connected_drivers()
    }

    fn connected_drivers(&self) -> OutboundMessage {
        OutboundMessage::ConnectedDrivers {
            connected_drivers: self.registry.driver_ids(),
        }
    }

    fn broadcast_connected_drivers(&self) -> Vec<Delivery> {
        let message = self.connected_drivers();
        self.registry
            .monitor_connections()
            .into_iter()
            .map(|to| Delivery {
                to,
                message: message.clone(),
            })
            .collect()
    }

    fn subscribe(
        &mut self,
        monitor: &MonitorId,
        request: SubscribeRequest,
    ) -> Result<(), RelayError> {
        if *monitor != request.monitor_id {
            return Err(RelayError::IdentityMismatch {
                message_type: "subscribe",
                claimed: request.monitor_id.to_string(),
                session: Identity::Monitor(monitor.clone()),
            });
        }
        let previous = self
            .subscriptions
            .subscribe(request.monitor_id, request.driver_id.clone());
        tracing::info!(
            monitor_id = %monitor,
            driver_id = %request.driver_id,
            previous = ?previous,
            "monitor subscribed"
        );
        Ok(())
    }

    fn forward_location(&self, report: LocationReport) -> Vec<Delivery> {
        let watchers: Vec<ConnectionId> = self
            .subscriptions
            .monitors_watching(&report.driver_id)
            .iter()
            .filter_map(|monitor| self.registry.monitor_connection(monitor))
            .collect();

        if watchers.is_empty() {
            tracing::debug!(
                driver_id = %report.driver_id,
                lat = %report.coord.lat,
                lng = %report.coord.lng,
                "no subscribed monitor online; location dropped"
            );
            return Vec::new();
        }

        let message = OutboundMessage::Location(report);
        watchers
            .into_iter()
            .map(|to| Delivery {
                to,
                message: message.clone(),
            })
            .collect()
    }

    fn assign(&mut self, request: AssignRequest) -> Vec<Delivery> {
        let AssignRequest { driver_id, delivery } = request;
        let deliveries = self.assignments.assign(driver_id.clone(), delivery).to_vec();
        tracing::info!(%driver_id, total = deliveries.len(), "delivery assigned");

        match self.registry.driver_connection(&driver_id) {
            Some(to) => vec![Delivery {
                to,
                message: OutboundMessage::Assign { deliveries },
            }],
            None => {
                tracing::debug!(%driver_id, "driver offline; assignment stored only");
                Vec::new()
            }
        }
    }

    fn require_driver<'a>(
        session: &'a Session,
        message_type: &'static str,
    ) -> Result<&'a DriverId, RelayError> {
        let identity = session.require_identity(message_type)?;
        match identity {
            Identity::Driver(id) => Ok(id),
            Identity::Monitor(_) => Err(RelayError::RoleMismatch {
                message_type,
                role: identity.role(),
            }),
        }
    }

    fn require_monitor<'a>(
        session: &'a Session,
        message_type: &'static str,
    ) -> Result<&'a MonitorId, RelayError> {
        let identity = session.require_identity(message_type)?;
        match identity {
            Identity::Monitor(id) => Ok(id),
            Identity::Driver(_) => Err(RelayError::RoleMismatch {
                message_type,
                role: identity.role(),
            }),
        }
    }
}
