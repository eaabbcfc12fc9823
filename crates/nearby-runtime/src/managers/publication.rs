//! Outbound broadcast management

use std::sync::Arc;

use nearby_core::{
    DiscoveryStrategy, DiscoveryTransport, NearbyResult, Payload, PublicationHandle,
};
use tracing::debug;

use super::connection::ConnectionManager;

#[derive(Debug)]
struct ActivePublication {
    handle: PublicationHandle,
    payload: Payload,
}

/// Owns zero or one active publication
pub struct PublicationController {
    transport: Arc<dyn DiscoveryTransport>,
    current: Option<ActivePublication>,
    published: u64,
}

impl PublicationController {
    pub fn new(transport: Arc<dyn DiscoveryTransport>) -> Self {
        Self {
            transport,
            current: None,
            published: 0,
        }
    }

    /// Broadcast `payload`, replacing any running publication
    pub fn publish(&mut self, connection: &ConnectionManager, payload: Payload) -> NearbyResult<()> {
        let session = connection.require_session()?;

        // The slot holds one publication; the old one goes off air first.
        self.unpublish();

        let handle =
            self.transport
                .start_publication(session, &payload, DiscoveryStrategy::broadcast())?;
        debug!("Started {} ({} bytes)", handle, payload.len());
        self.current = Some(ActivePublication { handle, payload });
        self.published += 1;
        Ok(())
    }

    /// Stop the running publication, if any
    pub fn unpublish(&mut self) {
        if let Some(previous) = self.current.take() {
            self.transport.stop_publication(previous.handle);
            debug!("Stopped {}", previous.handle);
        }
    }

    pub fn is_publishing(&self) -> bool {
        self.current.is_some()
    }

    /// Payload of the running publication
    pub fn payload(&self) -> Option<&Payload> {
        self.current.as_ref().map(|active| &active.payload)
    }

    /// Publications started over the controller's lifetime
    pub fn published_count(&self) -> u64 {
        self.published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::EventRouter;
    use nearby_core::{ApiKey, NearbyError};
    use nearby_harness::MockDiscoveryTransport;

    fn connected(transport: &Arc<MockDiscoveryTransport>) -> ConnectionManager {
        let router = EventRouter::new();
        let mut connection = ConnectionManager::new(transport.clone(), false);
        let key = ApiKey::new("key");
        let handlers = router.session_handlers();
        let handle = connection.open_session(&key, &handlers).unwrap();
        connection.install(handle, key, handlers);
        connection
    }

    #[test]
    fn test_publish_requires_session() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let connection = ConnectionManager::new(transport.clone(), false);
        let mut publication = PublicationController::new(transport.clone());

        let err = publication
            .publish(&connection, Payload::from_text("hi"))
            .unwrap_err();
        assert!(matches!(err, NearbyError::Runtime { .. }));
        assert!(!publication.is_publishing());
        assert_eq!(transport.active_publications(), 0);
    }

    #[test]
    fn test_publish_uses_broadcast_strategy() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let connection = connected(&transport);
        let mut publication = PublicationController::new(transport.clone());

        publication.publish(&connection, Payload::from_text("hi")).unwrap();
        assert_eq!(
            transport.publication_strategies(),
            vec![DiscoveryStrategy::broadcast()]
        );
    }

    #[test]
    fn test_second_publish_replaces_first() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let connection = connected(&transport);
        let mut publication = PublicationController::new(transport.clone());

        publication.publish(&connection, Payload::from_text("one")).unwrap();
        publication.publish(&connection, Payload::from_text("two")).unwrap();

        assert_eq!(transport.published_payloads(), vec![Payload::from_text("two")]);
        assert_eq!(publication.payload(), Some(&Payload::from_text("two")));
        assert_eq!(publication.published_count(), 2);
    }

    #[test]
    fn test_unpublish_without_publication() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let mut publication = PublicationController::new(transport.clone());
        publication.unpublish();
        assert!(!publication.is_publishing());
        assert!(transport.calls().is_empty());
    }
}
