//! Nearby Runtime Engine
//!
//! This crate contains the runtime that sits between a host client and a
//! discovery transport:
//! - `ConnectionManager`, `PublicationController`, `SubscriptionController`:
//!   the single session and its at-most-one publication and subscription
//! - `EventRouter`: turns transport callbacks into the ordered event stream
//! - `CoreTask`: the sole owner of that state, fed one command at a time
//! - `CommandGateway`: the six commands, each completing exactly once
//! - `RuntimeBuilder` / `RuntimeHandle`: wiring and shutdown

pub mod builder;
pub mod gateway;
pub mod logic;
pub mod managers;
pub mod router;

pub use builder::{RuntimeBuilder, RuntimeHandle};
pub use gateway::CommandGateway;
pub use logic::{CoreState, CoreTask};
pub use managers::*;
pub use router::EventRouter;

// Re-export core types for convenience
pub use nearby_core::{
    ApiKey, Command, CommandKind, DiscoveryTransport, ErrorKind, EventReceiver, NearbyConfig,
    NearbyError, NearbyEvent, NearbyResult, NearbyStatus, Payload, PermissionKind,
};
