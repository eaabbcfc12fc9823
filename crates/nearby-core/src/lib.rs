//! Nearby Core
//!
//! This crate provides the foundational types for proximity publish/subscribe
//! messaging: the payload and discovery strategy model, the error taxonomy,
//! the command/event channel schema and the contract a discovery transport
//! must satisfy. The runtime engine lives in `nearby-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod channel;
pub mod config;
pub mod errors;
pub mod transport;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use channel::{
    Command, CommandEnvelope, CommandKind, Completion, CompletionReceiver, EventReceiver,
    EventSink, NearbyEvent, NearbyStatus, PermissionKind, SUPPORTED_EVENTS,
};
pub use config::{ChannelConfig, NearbyConfig};
pub use errors::{ErrorKind, NearbyError, NearbyResult, TransportError};
pub use transport::{DiscoveryTransport, MessageHandlers, SessionErrorHandlers};
pub use types::{
    ApiKey, DiscoveryMedium, DiscoveryMode, DiscoveryStrategy, Payload, PublicationHandle,
    SessionHandle, SubscriptionHandle,
};
