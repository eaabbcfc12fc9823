//! Discovery transport contract
//!
//! The physical broadcast/scan machinery is an external collaborator. This
//! module defines what the runtime needs from it and the handler records the
//! runtime passes in. Transports call the handlers from whatever thread they
//! run callbacks on; a handler only ever forwards onto the event stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::channel::{EventSink, NearbyEvent};
use crate::errors::NearbyResult;
use crate::types::{
    ApiKey, DiscoveryStrategy, Payload, PublicationHandle, SessionHandle, SubscriptionHandle,
};

// ----------------------------------------------------------------------------
// Transport Trait
// ----------------------------------------------------------------------------

/// Proximity discovery backend
///
/// Start calls return once the transport has taken the work; found/lost and
/// error callbacks arrive later through the supplied handler records.
pub trait DiscoveryTransport: Send + Sync {
    /// Toggle the transport's own diagnostic output
    fn set_debug_logging(&self, enabled: bool);

    /// Whether the runtime environment granted the radio/microphone permission
    fn has_required_permission(&self) -> bool;

    /// Open a session bound to the given error handlers
    fn create_session(
        &self,
        api_key: &ApiKey,
        handlers: SessionErrorHandlers,
    ) -> NearbyResult<SessionHandle>;

    /// Release a session. Called after its publication and subscription stopped.
    fn close_session(&self, _session: SessionHandle) {}

    /// Begin broadcasting `payload`
    fn start_publication(
        &self,
        session: SessionHandle,
        payload: &Payload,
        strategy: DiscoveryStrategy,
    ) -> NearbyResult<PublicationHandle>;

    fn stop_publication(&self, handle: PublicationHandle);

    /// Begin scanning; found/lost messages are reported through `handlers`
    fn start_subscription(
        &self,
        session: SessionHandle,
        strategy: DiscoveryStrategy,
        handlers: MessageHandlers,
    ) -> NearbyResult<SubscriptionHandle>;

    fn stop_subscription(&self, handle: SubscriptionHandle);
}

// ----------------------------------------------------------------------------
// Handler Records
// ----------------------------------------------------------------------------

/// Session health callbacks, wired to the event stream
///
/// Goes inert once its session is closed or replaced, like [`MessageHandlers`].
#[derive(Debug, Clone)]
pub struct SessionErrorHandlers {
    sink: EventSink,
    active: Arc<AtomicBool>,
}

impl SessionErrorHandlers {
    pub fn new(sink: EventSink) -> Self {
        Self {
            sink,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Microphone permission was denied or revoked
    pub fn microphone_permission_error(&self, _has_error: bool) -> bool {
        self.forward(NearbyEvent::microphone_permission_error())
    }

    /// Bluetooth radio was powered off (`true`) or back on (`false`)
    pub fn bluetooth_power_error(&self, has_error: bool) -> bool {
        self.forward(NearbyEvent::BluetoothError { has_error })
    }

    /// Bluetooth permission was denied or revoked
    pub fn bluetooth_permission_error(&self, _has_error: bool) -> bool {
        self.forward(NearbyEvent::bluetooth_permission_error())
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop forwarding for this record and every clone of it
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn forward(&self, event: NearbyEvent) -> bool {
        if !self.is_active() {
            tracing::trace!("Ignoring {} from closed session", event.name());
            return false;
        }
        self.sink.emit(event)
    }
}

/// Found/lost callbacks for one subscription instance
///
/// Once the owning subscription is stopped the record goes inert, so late
/// callbacks from a stopped scan are not attributed to the stream.
#[derive(Debug, Clone)]
pub struct MessageHandlers {
    sink: EventSink,
    active: Arc<AtomicBool>,
}

impl MessageHandlers {
    pub fn new(sink: EventSink) -> Self {
        Self {
            sink,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A peer's message came into range
    pub fn message_found(&self, message: Payload) -> bool {
        self.forward(NearbyEvent::MessageFound { message })
    }

    /// A previously found message went out of range
    pub fn message_lost(&self, message: Payload) -> bool {
        self.forward(NearbyEvent::MessageLost { message })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop forwarding for this record and every clone of it
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn forward(&self, event: NearbyEvent) -> bool {
        if !self.is_active() {
            tracing::trace!("Ignoring {} from stopped subscription", event.name());
            return false;
        }
        self.sink.emit(event)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
