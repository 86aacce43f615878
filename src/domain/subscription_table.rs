//! Monitor → driver subscription table.
//!
//! Each monitor watches at most one driver at a time. Location routing
//! needs the reverse direction (which monitors watch driver `D`), which
//! is answered by scanning the table; monitor counts are expected in the
//! tens to low hundreds.

use indexmap::IndexMap;

use super::{DriverId, MonitorId};

/// Records, per monitor, the single driver it is currently watching.
///
/// Entries outlive the connections that created them: nothing is
/// removed when a monitor or driver disconnects, so a monitor that
/// reconnects under the same identifier keeps its subscription.
#[derive(Debug, Default)]
pub struct SubscriptionTable {
    targets: IndexMap<MonitorId, DriverId>,
}

impl SubscriptionTable {
    /// Creates an empty subscription table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Points `monitor` at `driver`, replacing any previous target.
    ///
    /// Returns the driver the monitor was watching before, if any.
    pub fn subscribe(&mut self, monitor: MonitorId, driver: DriverId) -> Option<DriverId> {
        self.targets.insert(monitor, driver)
    }

    /// Returns every monitor currently watching `driver`.
    #[must_use]
    pub fn monitors_watching(&self, driver: &DriverId) -> Vec<MonitorId> {
        self.targets
            .iter()
            .filter(|(_, target)| *target == driver)
            .map(|(monitor, _)| monitor.clone())
            .collect()
    }

    /// Returns the driver `monitor` is watching.
    #[must_use]
    pub fn target_of(&self, monitor: &MonitorId) -> Option<&DriverId> {
        self.targets.get(monitor)
    }

    /// Returns the number of monitors with a subscription.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if no monitor has subscribed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
