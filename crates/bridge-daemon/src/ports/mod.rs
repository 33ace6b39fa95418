//! Hexagonal ports of the bridge daemon.

pub mod inbound;
pub mod outbound;
