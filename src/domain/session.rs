//! Per-connection protocol state.
//!
//! ```text
//! Unauthenticated ──auth(driver, id)──▶ Authenticated(Driver(id)) ──┐
//!        │                                                          ├──close──▶ Closed
//!        └────────auth(monitor, id)──▶ Authenticated(Monitor(id)) ──┘
//! ```
//!
//! The identity bound by the first `auth` is fixed for the lifetime of the
//! connection.

use super::{ConnectionId, Identity};
use crate::error::RelayError;

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Socket accepted, no `auth` yet.
    Unauthenticated,
    /// Bound to a role and identifier.
    Authenticated(Identity),
    /// Transport closed; terminal.
    Closed,
}

/// Protocol state of one connection, owned by its connection task.
#[derive(Debug)]
pub struct Session {
    id: ConnectionId,
    state: SessionState,
}

impl Session {
    /// Starts an unauthenticated session for a freshly accepted socket.
    #[must_use]
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            state: SessionState::Unauthenticated,
        }
    }

    /// Connection this session belongs to.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the bound identity, if authenticated.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Unauthenticated | SessionState::Closed => None,
        }
    }

    /// Binds `identity` to this connection.
    ///
    /// Repeating `auth` with the identity already bound is accepted so the
    /// caller can re-register it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::AlreadyAuthenticated`] if a different identity
    /// is already bound, or [`RelayError::NotAuthenticated`] if the session
    /// is closed.
    pub fn authenticate(&mut self, identity: Identity) -> Result<(), RelayError> {
        match &self.state {
            SessionState::Unauthenticated => {
                self.state = SessionState::Authenticated(identity);
                Ok(())
            }
            SessionState::Authenticated(current) if *current == identity => Ok(()),
            SessionState::Authenticated(current) => Err(RelayError::AlreadyAuthenticated {
                current: current.clone(),
                requested: identity,
            }),
            SessionState::Closed => Err(RelayError::NotAuthenticated {
                message_type: "auth",
            }),
        }
    }

    /// Returns the bound identity or rejects `message_type`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NotAuthenticated`] if no identity is bound.
    pub fn require_identity(&self, message_type: &'static str) -> Result<&Identity, RelayError> {
        self.identity()
            .ok_or(RelayError::NotAuthenticated { message_type })
    }

    /// Moves to `Closed`, returning the identity that was bound, if any.
    pub fn close(&mut self) -> Option<Identity> {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Unauthenticated | SessionState::Closed => None,
        }
    }
}
