//! Session management
//!
//! The ConnectionManager owns the single transport session: it checks the
//! permission precondition, opens sessions with their error handlers bound,
//! and closes them again.

use std::sync::Arc;

use nearby_core::{
    ApiKey, DiscoveryTransport, NearbyError, NearbyResult, SessionErrorHandlers, SessionHandle,
};
use tracing::{debug, info, warn};

/// Human-readable name of the permission a session requires
const REQUIRED_PERMISSION: &str = "Bluetooth/Microphone";

// ----------------------------------------------------------------------------
// Connection Manager
// ----------------------------------------------------------------------------

#[derive(Debug)]
struct ActiveSession {
    handle: SessionHandle,
    api_key: ApiKey,
    handlers: SessionErrorHandlers,
}

/// Owns zero or one transport session
pub struct ConnectionManager {
    transport: Arc<dyn DiscoveryTransport>,
    session: Option<ActiveSession>,
    debug_logging: bool,
    stats: ConnectionStats,
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn DiscoveryTransport>, debug_logging: bool) -> Self {
        Self {
            transport,
            session: None,
            debug_logging,
            stats: ConnectionStats::default(),
        }
    }

    /// Open a new session without installing it
    ///
    /// Fails with a permission error when the environment has not granted
    /// the radio permission. The current session, if any, is left untouched.
    pub fn open_session(
        &mut self,
        api_key: &ApiKey,
        handlers: &SessionErrorHandlers,
    ) -> NearbyResult<SessionHandle> {
        self.transport.set_debug_logging(self.debug_logging);

        if !self.transport.has_required_permission() {
            self.stats.permission_denials += 1;
            warn!("Connect refused: {} permission not granted", REQUIRED_PERMISSION);
            return Err(NearbyError::permission_denied(REQUIRED_PERMISSION));
        }

        let handle = self.transport.create_session(api_key, handlers.clone())?;
        debug!("Opened {}", handle);
        Ok(handle)
    }

    /// Make `handle` the current session, closing the one it replaces
    ///
    /// `handlers` must be the record the session was opened with; it is
    /// deactivated when the session closes.
    pub fn install(
        &mut self,
        handle: SessionHandle,
        api_key: ApiKey,
        handlers: SessionErrorHandlers,
    ) {
        self.close_current();
        self.session = Some(ActiveSession {
            handle,
            api_key,
            handlers,
        });
        self.stats.sessions_opened += 1;
        info!("Connected with {}", handle);
    }

    /// Close the current session. Safe to call when nothing is connected.
    pub fn disconnect(&mut self) {
        if self.close_current() {
            info!("Disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<SessionHandle> {
        self.session.as_ref().map(|active| active.handle)
    }

    /// The current session, or the not-connected runtime error
    pub fn require_session(&self) -> NearbyResult<SessionHandle> {
        self.session().ok_or_else(NearbyError::not_connected)
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.session.as_ref().map(|active| &active.api_key)
    }

    pub fn get_statistics(&self) -> &ConnectionStats {
        &self.stats
    }

    fn close_current(&mut self) -> bool {
        match self.session.take() {
            Some(previous) => {
                previous.handlers.deactivate();
                self.transport.close_session(previous.handle);
                self.stats.sessions_closed += 1;
                debug!("Closed {}", previous.handle);
                true
            }
            None => false,
        }
    }
}

/// Connection statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    pub sessions_opened: u64,
    pub sessions_closed: u64,
    pub permission_denials: u64,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::EventRouter;
    use nearby_harness::{MockDiscoveryTransport, TransportCall};

    fn manager(transport: &Arc<MockDiscoveryTransport>) -> ConnectionManager {
        ConnectionManager::new(transport.clone(), true)
    }

    #[test]
    fn test_open_and_install() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let router = EventRouter::new();
        let mut connection = manager(&transport);

        let key = ApiKey::new("key1");
        let handlers = router.session_handlers();
        let handle = connection.open_session(&key, &handlers).unwrap();
        assert!(!connection.is_connected());

        connection.install(handle, key, handlers);
        assert!(connection.is_connected());
        assert_eq!(connection.require_session().unwrap(), handle);
        assert_eq!(connection.api_key().map(ApiKey::as_str), Some("key1"));
        assert!(transport.debug_logging_enabled());
    }

    #[test]
    fn test_permission_denied_leaves_no_session() {
        let transport = Arc::new(MockDiscoveryTransport::without_permission());
        let router = EventRouter::new();
        let mut connection = manager(&transport);

        let err = connection
            .open_session(&ApiKey::new("key"), &router.session_handlers())
            .unwrap_err();
        assert!(err.is_permission());
        assert!(!connection.is_connected());
        assert_eq!(transport.active_sessions(), 0);
        assert_eq!(connection.get_statistics().permission_denials, 1);
    }

    #[test]
    fn test_install_replaces_and_closes_previous() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let mut router = EventRouter::new();
        let mut events = router.take_receiver().unwrap();
        let mut connection = manager(&transport);

        let first_handlers = router.session_handlers();
        let first = connection
            .open_session(&ApiKey::new("a"), &first_handlers)
            .unwrap();
        connection.install(first, ApiKey::new("a"), first_handlers.clone());
        let second_handlers = router.session_handlers();
        let second = connection
            .open_session(&ApiKey::new("b"), &second_handlers)
            .unwrap();
        connection.install(second, ApiKey::new("b"), second_handlers.clone());

        assert_eq!(transport.active_sessions(), 1);
        assert!(transport.calls().contains(&TransportCall::CloseSession(first)));
        assert_eq!(connection.session(), Some(second));

        // Only the live session still reports health signals
        assert!(!first_handlers.bluetooth_power_error(true));
        assert!(second_handlers.bluetooth_power_error(true));
        assert_eq!(
            events.try_recv().unwrap(),
            nearby_core::NearbyEvent::BluetoothError { has_error: true }
        );
        assert!(events.try_recv().is_err());

        connection.disconnect();
        assert!(!second_handlers.is_active());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let transport = Arc::new(MockDiscoveryTransport::new());
        let mut connection = manager(&transport);
        connection.disconnect();
        connection.disconnect();
        assert!(!connection.is_connected());
        assert_eq!(connection.get_statistics().sessions_closed, 0);
        assert!(connection.require_session().is_err());
    }
}
