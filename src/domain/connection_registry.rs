//! Live connection lookup by self-declared identifier.
//!
//! [`ConnectionRegistry`] keeps one table per role. Each table maps an
//! identifier to the [`ConnectionId`] that most recently authenticated
//! under it. Tables are insertion-ordered so that the driver list sent to
//! monitors is deterministic for a given history of registrations.
//!
//! The registry holds no lock of its own; it is owned by
//! [`crate::service::RelayState`], which the hub guards with one mutex.

use std::hash::Hash;

use indexmap::IndexMap;

use super::{ConnectionId, DriverId, Identity, MonitorId};

/// Insertion-ordered `identifier → connection` table for one role.
#[derive(Debug)]
struct RoleTable<K> {
    entries: IndexMap<K, ConnectionId>,
}

impl<K: Hash + Eq + Clone> RoleTable<K> {
    fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Last writer wins. Overwriting keeps the key's original position.
    fn insert(&mut self, id: K, conn: ConnectionId) -> Option<ConnectionId> {
        self.entries.insert(id, conn)
    }

    fn get(&self, id: &K) -> Option<ConnectionId> {
        self.entries.get(id).copied()
    }

    fn remove_if(&mut self, id: &K, conn: ConnectionId) -> bool {
        if self.entries.get(id) != Some(&conn) {
            return false;
        }
        self.entries.shift_remove(id).is_some()
    }

    fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    fn connections(&self) -> Vec<ConnectionId> {
        self.entries.values().copied().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Binds driver and monitor identifiers to their live connections.
#[derive(Debug)]
pub struct ConnectionRegistry {
    drivers: RoleTable<DriverId>,
    monitors: RoleTable<MonitorId>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            drivers: RoleTable::new(),
            monitors: RoleTable::new(),
        }
    }

    /// Registers `conn` under `identity`, overwriting any previous entry.
    ///
    /// Returns the connection that was superseded, if any.
    pub fn register(&mut self, identity: &Identity, conn: ConnectionId) -> Option<ConnectionId> {
        match identity {
            Identity::Driver(id) => self.drivers.insert(id.clone(), conn),
            Identity::Monitor(id) => self.monitors.insert(id.clone(), conn),
        }
    }

    /// Returns the connection currently registered under `identity`.
    #[must_use]
    pub fn lookup(&self, identity: &Identity) -> Option<ConnectionId> {
        match identity {
            Identity::Driver(id) => self.drivers.get(id),
            Identity::Monitor(id) => self.monitors.get(id),
        }
    }

    /// Returns the connection registered for a driver.
    #[must_use]
    pub fn driver_connection(&self, id: &DriverId) -> Option<ConnectionId> {
        self.drivers.get(id)
    }

    /// Returns the connection registered for a monitor.
    #[must_use]
    pub fn monitor_connection(&self, id: &MonitorId) -> Option<ConnectionId> {
        self.monitors.get(id)
    }

    /// Removes the entry for `identity` only if it still points at `conn`.
    ///
    /// A connection that was superseded by a reconnect under the same
    /// identifier therefore cannot erase the newer registration when it
    /// closes. Returns `true` if an entry was removed.
    pub fn unregister(&mut self, identity: &Identity, conn: ConnectionId) -> bool {
        match identity {
            Identity::Driver(id) => self.drivers.remove_if(id, conn),
            Identity::Monitor(id) => self.monitors.remove_if(id, conn),
        }
    }

    /// Returns all registered driver identifiers in insertion order.
    #[must_use]
    pub fn driver_ids(&self) -> Vec<DriverId> {
        self.drivers.keys()
    }

    /// Returns the connections of all registered monitors in insertion order.
    #[must_use]
    pub fn monitor_connections(&self) -> Vec<ConnectionId> {
        self.monitors.connections()
    }

    /// Number of registered drivers.
    #[must_use]
    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    /// Number of registered monitors.
    #[must_use]
    pub fn monitor_count(&self) -> usize {
        self.monitors.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
