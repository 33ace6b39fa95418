//! # Msgr Bridge Test Suite
//!
//! Cross-crate tests for the bridge SDK.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── envelope_codec.rs  # criterion: encode / decode throughput
//! └── src/integration/
//!     ├── flows.rs           # producer → queue → daemon → telemetry
//!     └── multi_bridge.rs    # several daemons sharing one queue
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bridge-tests
//! cargo test -p bridge-tests integration::flows
//!
//! # Benchmarks
//! cargo bench -p bridge-tests
//! ```

pub mod integration;
