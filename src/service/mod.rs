//! Service layer: message routing and the shared relay coordinator.

pub mod relay_hub;
pub mod router;

pub use relay_hub::{DispatchReport, Outlet, RelayHub, RelayStats};
pub use router::{Delivery, RelayCounts, RelayState};
