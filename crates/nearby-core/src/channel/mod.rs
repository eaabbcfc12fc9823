//! Command and event channels
//!
//! - `communication`: command, event and status types
//! - `utils`: channel construction, completions and the event sink

pub mod communication;
pub mod utils;

pub use communication::{
    Command, CommandKind, NearbyEvent, NearbyStatus, PermissionKind, SUPPORTED_EVENTS,
};
pub use utils::{
    create_command_channel, create_event_channel, CommandEnvelope, CommandReceiver,
    CommandSender, Completion, CompletionReceiver, EventReceiver, EventSink, EventStats,
};
