//! Event routing
//!
//! The router owns the producer side of the event stream for the lifetime of
//! the runtime, independent of any session. It hands out the handler records
//! transports invoke; those records forward straight onto the stream, so event
//! order is exactly the order in which the transport invoked its callbacks.

use nearby_core::channel::{create_event_channel, EventStats};
use nearby_core::{EventReceiver, EventSink, MessageHandlers, SessionErrorHandlers};

/// Single outbound channel of [`NearbyEvent`](nearby_core::NearbyEvent)s
#[derive(Debug)]
pub struct EventRouter {
    sink: EventSink,
    receiver: Option<EventReceiver>,
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter {
    pub fn new() -> Self {
        let (sink, receiver) = create_event_channel();
        Self {
            sink,
            receiver: Some(receiver),
        }
    }

    /// Take the consumer side of the stream. Only the first call gets it.
    pub fn take_receiver(&mut self) -> Option<EventReceiver> {
        self.receiver.take()
    }

    /// Error handlers to bind to a new session
    pub fn session_handlers(&self) -> SessionErrorHandlers {
        SessionErrorHandlers::new(self.sink.clone())
    }

    /// Found/lost handlers for a new subscription instance
    pub fn message_handlers(&self) -> MessageHandlers {
        MessageHandlers::new(self.sink.clone())
    }

    pub fn stats(&self) -> &EventStats {
        self.sink.stats()
    }
}
