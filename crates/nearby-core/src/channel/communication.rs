//! Channel Communication Protocol Types
//!
//! This module defines the typed protocol between the host client and the
//! owner task. Commands flow in and complete exactly once; events flow out
//! unsolicited and in arrival order.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::types::{ApiKey, Payload};

// ----------------------------------------------------------------------------
// Command: Client → Owner Task
// ----------------------------------------------------------------------------

/// Commands issued by the host client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Open a session with the discovery transport
    Connect { api_key: ApiKey },
    /// Tear down subscription, publication and session
    Disconnect,
    /// Broadcast a message to nearby peers
    Publish { message: Payload },
    /// Stop broadcasting
    Unpublish,
    /// Start scanning for nearby peers' messages
    Subscribe,
    /// Stop scanning
    Unsubscribe,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Connect { .. } => CommandKind::Connect,
            Command::Disconnect => CommandKind::Disconnect,
            Command::Publish { .. } => CommandKind::Publish,
            Command::Unpublish => CommandKind::Unpublish,
            Command::Subscribe => CommandKind::Subscribe,
            Command::Unsubscribe => CommandKind::Unsubscribe,
        }
    }
}

/// Command identifier, used for logging and rejection codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Connect,
    Disconnect,
    Publish,
    Unpublish,
    Subscribe,
    Unsubscribe,
    Status,
}

impl CommandKind {
    /// Stable code attached to a rejected command
    pub fn error_code(&self) -> &'static str {
        match self {
            CommandKind::Connect => "NEARBY_MESSAGES_ERROR_CONNECT",
            CommandKind::Disconnect => "NEARBY_MESSAGES_ERROR_DISCONNECT",
            CommandKind::Publish => "NEARBY_MESSAGES_ERROR_PUBLISH",
            CommandKind::Unpublish => "NEARBY_MESSAGES_ERROR_UNPUBLISH",
            CommandKind::Subscribe => "NEARBY_MESSAGES_ERROR_SUBSCRIBE",
            CommandKind::Unsubscribe => "NEARBY_MESSAGES_ERROR_UNSUBSCRIBE",
            CommandKind::Status => "NEARBY_MESSAGES_ERROR_STATUS",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Connect => write!(f, "connect"),
            CommandKind::Disconnect => write!(f, "disconnect"),
            CommandKind::Publish => write!(f, "publish"),
            CommandKind::Unpublish => write!(f, "unpublish"),
            CommandKind::Subscribe => write!(f, "subscribe"),
            CommandKind::Unsubscribe => write!(f, "unsubscribe"),
            CommandKind::Status => write!(f, "status"),
        }
    }
}

// ----------------------------------------------------------------------------
// NearbyEvent: Transport → Client
// ----------------------------------------------------------------------------

/// Wire names of every event kind, in declaration order
pub const SUPPORTED_EVENTS: [&str; 4] = [
    "MESSAGE_FOUND",
    "MESSAGE_LOST",
    "BLUETOOTH_ERROR",
    "PERMISSION_ERROR",
];

/// Unsolicited notifications delivered on the event stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NearbyEvent {
    /// A nearby peer's published message came into range
    MessageFound { message: Payload },
    /// A previously found message is no longer in range
    MessageLost { message: Payload },
    /// Bluetooth power state changed
    BluetoothError {
        #[serde(rename = "hasError")]
        has_error: bool,
    },
    /// A permission was revoked or denied while the session was live
    ///
    /// The microphone callback reports under `permission`, the bluetooth one
    /// under `message`. Exactly one of the two is set.
    PermissionError {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permission: Option<PermissionKind>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<PermissionKind>,
    },
}

impl NearbyEvent {
    /// `PERMISSION_ERROR{permission: "microphone"}`
    pub fn microphone_permission_error() -> Self {
        NearbyEvent::PermissionError {
            permission: Some(PermissionKind::Microphone),
            message: None,
        }
    }

    /// `PERMISSION_ERROR{message: "bluetooth"}`
    pub fn bluetooth_permission_error() -> Self {
        NearbyEvent::PermissionError {
            permission: None,
            message: Some(PermissionKind::Bluetooth),
        }
    }

    /// Wire name of the event kind
    pub fn name(&self) -> &'static str {
        match self {
            NearbyEvent::MessageFound { .. } => SUPPORTED_EVENTS[0],
            NearbyEvent::MessageLost { .. } => SUPPORTED_EVENTS[1],
            NearbyEvent::BluetoothError { .. } => SUPPORTED_EVENTS[2],
            NearbyEvent::PermissionError { .. } => SUPPORTED_EVENTS[3],
        }
    }

    /// Payload carried by found/lost events
    pub fn message(&self) -> Option<&Payload> {
        match self {
            NearbyEvent::MessageFound { message } | NearbyEvent::MessageLost { message } => {
                Some(message)
            }
            _ => None,
        }
    }

    /// Permission named by a permission error, whichever body key carries it
    pub fn denied_permission(&self) -> Option<PermissionKind> {
        match self {
            NearbyEvent::PermissionError {
                permission,
                message,
            } => (*permission).or(*message),
            _ => None,
        }
    }
}

impl fmt::Display for NearbyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NearbyEvent::MessageFound { message } | NearbyEvent::MessageLost { message } => {
                write!(f, "{}{{{}}}", self.name(), message)
            }
            NearbyEvent::BluetoothError { has_error } => {
                write!(f, "{}{{hasError={}}}", self.name(), has_error)
            }
            NearbyEvent::PermissionError {
                permission: Some(kind),
                ..
            } => write!(f, "{}{{permission={}}}", self.name(), kind),
            NearbyEvent::PermissionError {
                message: Some(kind),
                ..
            } => write!(f, "{}{{message={}}}", self.name(), kind),
            NearbyEvent::PermissionError { .. } => write!(f, "{}{{}}", self.name()),
        }
    }
}

/// Permission named by a secondary permission error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    Microphone,
    Bluetooth,
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionKind::Microphone => write!(f, "microphone"),
            PermissionKind::Bluetooth => write!(f, "bluetooth"),
        }
    }
}

// ----------------------------------------------------------------------------
// Supporting Types
// ----------------------------------------------------------------------------

/// Snapshot of the owner task's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearbyStatus {
    pub connected: bool,
    /// Payload of the active publication, if any
    pub publishing: Option<Payload>,
    pub subscribed: bool,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let found = NearbyEvent::MessageFound {
            message: Payload::from_text("hi"),
        };
        assert_eq!(found.name(), "MESSAGE_FOUND");
        assert_eq!(
            NearbyEvent::BluetoothError { has_error: true }.name(),
            "BLUETOOTH_ERROR"
        );
        assert_eq!(format!("{}", found), "MESSAGE_FOUND{hi}");
    }

    #[test]
    fn test_event_wire_shape() {
        let found = NearbyEvent::MessageFound {
            message: Payload::from_text("hello"),
        };
        assert_eq!(
            serde_json::to_value(&found).unwrap(),
            serde_json::json!({ "type": "MESSAGE_FOUND", "message": "hello" })
        );

        let bt = NearbyEvent::BluetoothError { has_error: false };
        assert_eq!(
            serde_json::to_value(&bt).unwrap(),
            serde_json::json!({ "type": "BLUETOOTH_ERROR", "hasError": false })
        );

        let microphone = NearbyEvent::microphone_permission_error();
        assert_eq!(
            serde_json::to_value(&microphone).unwrap(),
            serde_json::json!({ "type": "PERMISSION_ERROR", "permission": "microphone" })
        );

        let bluetooth = NearbyEvent::bluetooth_permission_error();
        assert_eq!(
            serde_json::to_string(&bluetooth).unwrap(),
            r#"{"type":"PERMISSION_ERROR","message":"bluetooth"}"#
        );
    }

    #[test]
    fn test_permission_error_bodies_parse_back() {
        let microphone: NearbyEvent =
            serde_json::from_str(r#"{"type":"PERMISSION_ERROR","permission":"microphone"}"#)
                .unwrap();
        assert_eq!(microphone, NearbyEvent::microphone_permission_error());
        assert_eq!(
            microphone.denied_permission(),
            Some(PermissionKind::Microphone)
        );

        let bluetooth: NearbyEvent =
            serde_json::from_str(r#"{"type":"PERMISSION_ERROR","message":"bluetooth"}"#).unwrap();
        assert_eq!(bluetooth.denied_permission(), Some(PermissionKind::Bluetooth));
        assert_eq!(format!("{}", bluetooth), "PERMISSION_ERROR{message=bluetooth}");
    }

    #[test]
    fn test_command_kinds_and_codes() {
        let cmd = Command::Publish {
            message: Payload::from_text("x"),
        };
        assert_eq!(cmd.kind(), CommandKind::Publish);
        assert_eq!(cmd.kind().error_code(), "NEARBY_MESSAGES_ERROR_PUBLISH");
        assert_eq!(format!("{}", CommandKind::Unsubscribe), "unsubscribe");
    }
}
