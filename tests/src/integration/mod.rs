//! Integration flows across bridge-types, bridge-bus, bridge-telemetry and
//! bridge-daemon.

pub mod flows;
pub mod multi_bridge;
