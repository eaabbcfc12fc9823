//! Nearby Harness - in-memory discovery transport
//!
//! Provides a deterministic [`MockDiscoveryTransport`] for tests and demos. Any
//! number of mock devices can share one [`SimulatedMedium`]: a publication
//! started on one device is "found" by subscriptions on the others and "lost"
//! again when it stops. Tests can also inject found/lost and session error
//! callbacks directly.

pub mod medium;
pub mod mock_transport;

pub use medium::SimulatedMedium;
pub use mock_transport::{MockDiscoveryTransport, TransportCall};
