//! Error types for proximity messaging
//!
//! Command failures surface to the caller as one of two kinds, permission or
//! runtime. Asynchronous transport health signals are not errors here; they
//! travel on the event stream (see [`crate::channel::NearbyEvent`]).

use core::fmt;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Failures reported by a discovery transport while starting or stopping work
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Session could not be created: {reason}")]
    SessionRejected { reason: String },
    #[error("Publication could not be started: {reason}")]
    PublicationRejected { reason: String },
    #[error("Subscription could not be started: {reason}")]
    SubscriptionRejected { reason: String },
    #[error("Transport is not available: {reason}")]
    Unavailable { reason: String },
}

/// The failure kinds a command may complete with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required hardware permission has not been granted
    Permission,
    /// The command was issued in the wrong state, or the transport refused it
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Permission => write!(f, "PermissionError"),
            ErrorKind::Runtime => write!(f, "RuntimeError"),
        }
    }
}

// ----------------------------------------------------------------------------
// Main Error Type
// ----------------------------------------------------------------------------

/// Core error type for proximity messaging
#[derive(Debug, thiserror::Error)]
pub enum NearbyError {
    #[error("Permission has been denied! Denied Permission: {permission}. Make sure the app declares its Bluetooth usage description!")]
    Permission { permission: String },

    #[error("{message}")]
    Runtime { message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel communication error between the gateway and the owner task
    #[error("Channel error: {message}")]
    Channel { message: String },

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl NearbyError {
    /// The permission required by the transport has not been granted
    pub fn permission_denied<T: Into<String>>(permission: T) -> Self {
        NearbyError::Permission {
            permission: permission.into(),
        }
    }

    /// A publish or subscribe was attempted before connect
    pub fn not_connected() -> Self {
        NearbyError::Runtime {
            message: "Nearby Messages is not connected! Call connect() before any other calls."
                .into(),
        }
    }

    pub fn runtime<T: Into<String>>(message: T) -> Self {
        NearbyError::Runtime {
            message: message.into(),
        }
    }

    pub fn channel_error<T: Into<String>>(message: T) -> Self {
        NearbyError::Channel {
            message: message.into(),
        }
    }

    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        NearbyError::Configuration {
            reason: reason.into(),
        }
    }

    /// Classify into the failure kinds exposed on the command surface
    pub fn kind(&self) -> ErrorKind {
        match self {
            NearbyError::Permission { .. } => ErrorKind::Permission,
            NearbyError::Runtime { .. }
            | NearbyError::Transport(_)
            | NearbyError::Channel { .. }
            | NearbyError::Configuration { .. } => ErrorKind::Runtime,
        }
    }

    pub fn is_permission(&self) -> bool {
        self.kind() == ErrorKind::Permission
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type NearbyResult<T> = core::result::Result<T, NearbyError>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(NearbyError::permission_denied("Bluetooth").kind(), ErrorKind::Permission);
        assert_eq!(NearbyError::not_connected().kind(), ErrorKind::Runtime);
        assert_eq!(
            NearbyError::from(TransportError::Unavailable { reason: "off".into() }).kind(),
            ErrorKind::Runtime
        );
        assert_eq!(NearbyError::channel_error("closed").kind(), ErrorKind::Runtime);
    }

    #[test]
    fn test_error_messages() {
        let err = NearbyError::permission_denied("Bluetooth/Microphone");
        assert!(err.to_string().contains("Denied Permission: Bluetooth/Microphone"));

        let err = NearbyError::not_connected();
        assert!(err.to_string().contains("Call connect() before any other calls"));
    }
}
