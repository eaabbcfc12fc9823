//! Inbound scan management
//!
//! Each subscription instance gets its own handler record from the router.
//! Stopping the subscription deactivates that record before the transport is
//! told to stop, so callbacks the transport fires afterwards are not routed.

use std::sync::Arc;

use nearby_core::{
    DiscoveryStrategy, DiscoveryTransport, MessageHandlers, NearbyResult, SubscriptionHandle,
};
use tracing::{debug, warn};

use super::connection::ConnectionManager;
use crate::router::EventRouter;

#[derive(Debug)]
struct ActiveSubscription {
    handle: SubscriptionHandle,
    handlers: MessageHandlers,
}

/// Owns zero or one active subscription
pub struct SubscriptionController {
    transport: Arc<dyn DiscoveryTransport>,
    current: Option<ActiveSubscription>,
    subscribed: u64,
}

impl SubscriptionController {
    pub fn new(transport: Arc<dyn DiscoveryTransport>) -> Self {
        Self {
            transport,
            current: None,
            subscribed: 0,
        }
    }

    /// Start scanning, replacing any running subscription
    pub fn subscribe(
        &mut self,
        connection: &ConnectionManager,
        router: &EventRouter,
    ) -> NearbyResult<()> {
        let session = connection.require_session()?;

        self.unsubscribe();

        let handlers = router.message_handlers();
        let handle = match self.transport.start_subscription(
            session,
            DiscoveryStrategy::scan(),
            handlers.clone(),
        ) {
            Ok(handle) => handle,
            Err(e) => {
                // The transport may have kept a copy of the record.
                handlers.deactivate();
                warn!("Subscription refused by transport: {}", e);
                return Err(e);
            }
        };

        debug!("Started {}", handle);
        self.current = Some(ActiveSubscription { handle, handlers });
        self.subscribed += 1;
        Ok(())
    }

    /// Stop the running subscription, if any
    pub fn unsubscribe(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.handlers.deactivate();
            self.transport.stop_subscription(previous.handle);
            debug!("Stopped {}", previous.handle);
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.current.is_some()
    }

    /// Subscriptions started over the controller's lifetime
    pub fn subscribed_count(&self) -> u64 {
        self.subscribed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearby_core::{ApiKey, NearbyEvent, Payload};
    use nearby_harness::MockDiscoveryTransport;

    fn connected(
        transport: &Arc<MockDiscoveryTransport>,
        router: &EventRouter,
    ) -> ConnectionManager {
        let mut connection = ConnectionManager::new(transport.clone(), false);
        let key = ApiKey::new("key");
        let handlers = router.session_handlers();
        let handle = connection.open_session(&key, &handlers).unwrap();
        connection.install(handle, key, handlers);
        connection
    }

    #[test]
    fn test_subscribe_requires_session() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let router = EventRouter::new();
        let connection = ConnectionManager::new(transport.clone(), false);
        let mut subscription = SubscriptionController::new(transport.clone());

        assert!(subscription.subscribe(&connection, &router).is_err());
        assert!(!subscription.is_subscribed());
        assert_eq!(transport.active_subscriptions(), 0);
    }

    #[test]
    fn test_found_and_lost_are_forwarded() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let mut router = EventRouter::new();
        let mut events = router.take_receiver().unwrap();
        let connection = connected(&transport, &router);
        let mut subscription = SubscriptionController::new(transport.clone());

        subscription.subscribe(&connection, &router).unwrap();
        assert_eq!(transport.subscription_strategies(), vec![DiscoveryStrategy::scan()]);

        transport.deliver_found(Payload::from_text("hello"));
        transport.deliver_lost(Payload::from_text("hello"));

        assert_eq!(
            events.try_recv().unwrap(),
            NearbyEvent::MessageFound { message: Payload::from_text("hello") }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            NearbyEvent::MessageLost { message: Payload::from_text("hello") }
        );
    }

    #[test]
    fn test_replaced_subscription_goes_quiet() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let mut router = EventRouter::new();
        let mut events = router.take_receiver().unwrap();
        let connection = connected(&transport, &router);
        let mut subscription = SubscriptionController::new(transport.clone());

        subscription.subscribe(&connection, &router).unwrap();
        subscription.subscribe(&connection, &router).unwrap();
        assert_eq!(transport.active_subscriptions(), 1);
        assert_eq!(subscription.subscribed_count(), 2);

        // A late callback on the first instance is dropped.
        let history = transport.subscription_handler_history();
        assert!(!history[0].message_found(Payload::from_text("stale")));
        assert!(history[1].message_found(Payload::from_text("fresh")));

        assert_eq!(
            events.try_recv().unwrap(),
            NearbyEvent::MessageFound { message: Payload::from_text("fresh") }
        );
        assert!(events.try_recv().is_err());
    }
}
