//! Core types for proximity messaging
//!
//! Payloads, credentials, discovery strategies and the opaque handles a
//! discovery transport hands back for sessions, publications and subscriptions.

use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ----------------------------------------------------------------------------
// Payload
// ----------------------------------------------------------------------------

/// Opaque message content broadcast to, or received from, nearby peers
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wrap raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Encode text as UTF-8, the way the host application hands messages over
    pub fn from_text(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode as UTF-8 text, returning `None` for non-text payloads
    pub fn as_text(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }

    /// Decode as UTF-8 text, replacing invalid sequences
    pub fn to_text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "Payload({:?})", text),
            None => write!(f, "Payload({} bytes)", self.0.len()),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text_lossy())
    }
}

// Payloads cross the host boundary as text.
impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text_lossy())
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Payload::from(text))
    }
}

// ----------------------------------------------------------------------------
// API Key
// ----------------------------------------------------------------------------

/// Opaque credential used to open a discovery session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<T: Into<String>>(key: T) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<redacted, {} chars>)", self.0.len())
    }
}

// ----------------------------------------------------------------------------
// Discovery Strategy
// ----------------------------------------------------------------------------

/// Physical medium used for discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscoveryMedium {
    /// Short-range radio (Bluetooth Low Energy)
    Ble,
}

/// Whether the local device advertises or listens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscoveryMode {
    Broadcast,
    Scan,
}

/// The (medium, mode) pair handed to the transport on every start call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveryStrategy {
    pub medium: DiscoveryMedium,
    pub mode: DiscoveryMode,
}

impl DiscoveryStrategy {
    /// Strategy used by publications
    pub const fn broadcast() -> Self {
        Self {
            medium: DiscoveryMedium::Ble,
            mode: DiscoveryMode::Broadcast,
        }
    }

    /// Strategy used by subscriptions
    pub const fn scan() -> Self {
        Self {
            medium: DiscoveryMedium::Ble,
            mode: DiscoveryMode::Scan,
        }
    }
}

impl fmt::Display for DiscoveryMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryMedium::Ble => write!(f, "BLE"),
        }
    }
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryMode::Broadcast => write!(f, "broadcast"),
            DiscoveryMode::Scan => write!(f, "scan"),
        }
    }
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.medium, self.mode)
    }
}

// ----------------------------------------------------------------------------
// Transport Handles
// ----------------------------------------------------------------------------

macro_rules! transport_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

transport_handle!(
    /// Identifies a live transport session
    SessionHandle,
    "session"
);
transport_handle!(
    /// Identifies a running publication
    PublicationHandle,
    "publication"
);
transport_handle!(
    /// Identifies a running subscription
    SubscriptionHandle,
    "subscription"
);

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_text_is_utf8_bytes() {
        let payload = Payload::from_text("héllo");
        assert_eq!(payload.as_bytes(), "héllo".as_bytes());
        assert_eq!(payload.as_text(), Some("héllo"));
    }

    #[test]
    fn test_payload_keeps_non_utf8_bytes() {
        let payload = Payload::new(vec![0xff, 0x00, 0xfe]);
        assert_eq!(payload.len(), 3);
        assert!(payload.as_text().is_none());
        assert_eq!(format!("{:?}", payload), "Payload(3 bytes)");
    }

    #[test]
    fn test_strategies() {
        assert_eq!(DiscoveryStrategy::broadcast().mode, DiscoveryMode::Broadcast);
        assert_eq!(DiscoveryStrategy::scan().mode, DiscoveryMode::Scan);
        assert_eq!(DiscoveryStrategy::scan().medium, DiscoveryMedium::Ble);
        assert_eq!(format!("{}", DiscoveryStrategy::broadcast()), "BLE/broadcast");
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("super-secret"));
        assert_eq!(key.as_str(), "super-secret");
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(format!("{}", SessionHandle::new(7)), "session#7");
        assert_eq!(SubscriptionHandle::new(3).raw(), 3);
    }
}
