//! Runtime configuration
//!
//! Configuration for the owner task and the channels around it. All structures
//! are serde-friendly so hosts can load them from files.

use crate::errors::{NearbyError, NearbyResult};

// ----------------------------------------------------------------------------
// Channel Configuration
// ----------------------------------------------------------------------------

/// Configuration for channel buffer sizes
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Buffer size for the command channel (gateway → owner task)
    pub command_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 32, // Commands are infrequent
        }
    }
}

impl ChannelConfig {
    /// Minimal buffers for tests that want to exercise backpressure
    pub fn minimal() -> Self {
        Self {
            command_buffer_size: 1,
        }
    }
}

// ----------------------------------------------------------------------------
// Nearby Configuration
// ----------------------------------------------------------------------------

/// Top-level configuration for a nearby messaging runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NearbyConfig {
    /// Forwarded to the transport on every connect
    pub debug_logging: bool,
    /// Channel buffer configuration
    pub channels: ChannelConfig,
}

impl NearbyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable transport debug logging
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Set channel configuration
    pub fn with_channels(mut self, channels: ChannelConfig) -> Self {
        self.channels = channels;
        self
    }

    /// Set the command channel buffer size
    pub fn with_command_buffer_size(mut self, size: usize) -> Self {
        self.channels.command_buffer_size = size;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> NearbyResult<()> {
        if self.channels.command_buffer_size == 0 {
            return Err(NearbyError::config_error(
                "command_buffer_size must be greater than zero",
            ));
        }
        Ok(())
    }
}
