//! Per-driver delivery-job assignments.

use std::collections::HashMap;

use super::DriverId;

/// Opaque delivery-job reference as sent by the assignment originator.
///
/// The relay never interprets it; any JSON value (an id string, a number,
/// or a full job object) is stored and pushed back verbatim.
pub type DeliveryRef = serde_json::Value;

/// Append-only lists of delivery jobs keyed by driver.
#[derive(Debug, Default)]
pub struct AssignmentStore {
    assignments: HashMap<DriverId, Vec<DeliveryRef>>,
}

impl AssignmentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `delivery` to `driver`'s list and returns the full list.
    ///
    /// The list is created on first use; the driver does not need to be
    /// connected.
    pub fn assign(&mut self, driver: DriverId, delivery: DeliveryRef) -> &[DeliveryRef] {
        let list = self.assignments.entry(driver).or_default();
        list.push(delivery);
        list
    }

    /// Returns the deliveries assigned to `driver`, oldest first.
    #[must_use]
    pub fn list_for(&self, driver: &DriverId) -> &[DeliveryRef] {
        self.assignments.get(driver).map(Vec::as_slice).unwrap_or(&[])
    }
}
