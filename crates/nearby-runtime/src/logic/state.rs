//! Owner state
//!
//! `CoreState` holds the session, publication and subscription slots together
//! with the router. Only the core task touches it, which is what serialises
//! every mutation.

use std::sync::Arc;

use nearby_core::{
    ApiKey, Command, DiscoveryTransport, NearbyConfig, NearbyResult, NearbyStatus, Payload,
};
use tracing::debug;

use crate::managers::{ConnectionManager, PublicationController, SubscriptionController};
use crate::router::EventRouter;

/// Command processing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreStats {
    pub commands_processed: u64,
    pub commands_failed: u64,
}

/// Consolidated state of one nearby messaging runtime
pub struct CoreState {
    connection: ConnectionManager,
    publication: PublicationController,
    subscription: SubscriptionController,
    router: EventRouter,
    stats: CoreStats,
}

impl CoreState {
    pub fn new(
        transport: Arc<dyn DiscoveryTransport>,
        router: EventRouter,
        config: &NearbyConfig,
    ) -> Self {
        Self {
            connection: ConnectionManager::new(transport.clone(), config.debug_logging),
            publication: PublicationController::new(transport.clone()),
            subscription: SubscriptionController::new(transport),
            router,
            stats: CoreStats::default(),
        }
    }

    /// Execute one command against the owned state
    pub fn execute(&mut self, command: Command) -> NearbyResult<()> {
        let result = match command {
            Command::Connect { api_key } => self.connect(api_key),
            Command::Disconnect => {
                self.disconnect();
                Ok(())
            }
            Command::Publish { message } => self.publish(message),
            Command::Unpublish => {
                self.publication.unpublish();
                Ok(())
            }
            Command::Subscribe => self.subscribe(),
            Command::Unsubscribe => {
                self.subscription.unsubscribe();
                Ok(())
            }
        };

        self.stats.commands_processed += 1;
        if result.is_err() {
            self.stats.commands_failed += 1;
        }
        result
    }

    /// Open a fresh session; work bound to a previous session is stopped first
    pub fn connect(&mut self, api_key: ApiKey) -> NearbyResult<()> {
        let handlers = self.router.session_handlers();
        let session = self.connection.open_session(&api_key, &handlers)?;

        if self.connection.is_connected() {
            debug!("Replacing existing session");
            self.subscription.unsubscribe();
            self.publication.unpublish();
        }
        self.connection.install(session, api_key, handlers);
        Ok(())
    }

    /// Clear subscription, publication and session, in that order
    pub fn disconnect(&mut self) {
        self.subscription.unsubscribe();
        self.publication.unpublish();
        self.connection.disconnect();
    }

    pub fn publish(&mut self, payload: Payload) -> NearbyResult<()> {
        self.publication.publish(&self.connection, payload)
    }

    pub fn subscribe(&mut self) -> NearbyResult<()> {
        self.subscription.subscribe(&self.connection, &self.router)
    }

    pub fn status(&self) -> NearbyStatus {
        NearbyStatus {
            connected: self.connection.is_connected(),
            publishing: self.publication.payload().cloned(),
            subscribed: self.subscription.is_subscribed(),
        }
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn stats(&self) -> &CoreStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearby_harness::MockDiscoveryTransport;

    fn state(transport: &Arc<MockDiscoveryTransport>) -> CoreState {
        CoreState::new(transport.clone(), EventRouter::new(), &NearbyConfig::default())
    }

    #[test]
    fn test_disconnect_clears_everything() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let mut state = state(&transport);

        state.execute(Command::Connect { api_key: ApiKey::new("k") }).unwrap();
        state
            .execute(Command::Publish { message: Payload::from_text("m") })
            .unwrap();
        state.execute(Command::Subscribe).unwrap();
        assert_eq!(
            state.status(),
            NearbyStatus {
                connected: true,
                publishing: Some(Payload::from_text("m")),
                subscribed: true,
            }
        );

        state.execute(Command::Disconnect).unwrap();
        assert_eq!(state.status(), NearbyStatus::default());
        assert_eq!(transport.active_sessions(), 0);
        assert_eq!(transport.active_publications(), 0);
        assert_eq!(transport.active_subscriptions(), 0);
    }

    #[test]
    fn test_reconnect_stops_work_of_old_session() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let mut state = state(&transport);

        state.execute(Command::Connect { api_key: ApiKey::new("a") }).unwrap();
        state.execute(Command::Subscribe).unwrap();
        state.execute(Command::Connect { api_key: ApiKey::new("b") }).unwrap();

        assert!(state.status().connected);
        assert!(!state.status().subscribed);
        assert_eq!(transport.active_sessions(), 1);
        assert_eq!(transport.active_subscriptions(), 0);
    }

    #[test]
    fn test_denied_reconnect_keeps_current_session() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let mut state = state(&transport);

        state.execute(Command::Connect { api_key: ApiKey::new("a") }).unwrap();
        transport.set_permission_granted(false);
        let err = state
            .execute(Command::Connect { api_key: ApiKey::new("b") })
            .unwrap_err();

        assert!(err.is_permission());
        assert!(state.status().connected);
        assert_eq!(state.connection().api_key().map(ApiKey::as_str), Some("a"));
        assert_eq!(state.stats().commands_failed, 1);
    }
}
