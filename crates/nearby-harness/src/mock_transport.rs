//! Mock Discovery Transport for Testing
//!
//! Deterministic implementation of [`DiscoveryTransport`] without radio
//! hardware. Every call is recorded so tests can assert on lifecycle ordering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use nearby_core::{
    ApiKey, DiscoveryStrategy, DiscoveryTransport, MessageHandlers, NearbyResult, Payload,
    PublicationHandle, SessionErrorHandlers, SessionHandle, SubscriptionHandle, TransportError,
};
use tracing::debug;

use crate::medium::{PublicationRecord, SessionRecord, SimulatedMedium, SubscriptionRecord};

// ----------------------------------------------------------------------------
// Call Log
// ----------------------------------------------------------------------------

/// A transport call, as observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    SetDebugLogging(bool),
    CreateSession(SessionHandle),
    CloseSession(SessionHandle),
    StartPublication(PublicationHandle, Payload),
    StopPublication(PublicationHandle),
    StartSubscription(SubscriptionHandle),
    StopSubscription(SubscriptionHandle),
}

// ----------------------------------------------------------------------------
// Mock Transport
// ----------------------------------------------------------------------------

/// One simulated device attached to a [`SimulatedMedium`]
#[derive(Debug)]
pub struct MockDiscoveryTransport {
    device: u64,
    medium: SimulatedMedium,
    permission_granted: AtomicBool,
    debug_logging: AtomicBool,
    session_failure: Mutex<Option<String>>,
    calls: Mutex<Vec<TransportCall>>,
    /// Handlers of every subscription ever started, including stopped ones
    handler_history: Mutex<Vec<MessageHandlers>>,
    /// Error handlers of every session ever opened, including closed ones
    session_history: Mutex<Vec<SessionErrorHandlers>>,
}

impl Default for MockDiscoveryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDiscoveryTransport {
    /// A device on its own private medium, with permission granted
    pub fn new() -> Self {
        Self::on_medium(SimulatedMedium::new())
    }

    /// A device sharing `medium` with other mock devices
    pub fn on_medium(medium: SimulatedMedium) -> Self {
        Self {
            device: medium.allocate_id(),
            medium,
            permission_granted: AtomicBool::new(true),
            debug_logging: AtomicBool::new(false),
            session_failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            handler_history: Mutex::new(Vec::new()),
            session_history: Mutex::new(Vec::new()),
        }
    }

    /// A device whose environment has not granted the radio permission
    pub fn without_permission() -> Self {
        let transport = Self::new();
        transport.set_permission_granted(false);
        transport
    }

    pub fn medium(&self) -> &SimulatedMedium {
        &self.medium
    }

    pub fn set_permission_granted(&self, granted: bool) {
        self.permission_granted.store(granted, Ordering::SeqCst);
    }

    pub fn debug_logging_enabled(&self) -> bool {
        self.debug_logging.load(Ordering::SeqCst)
    }

    /// Make the next `create_session` call fail with `reason`
    pub fn fail_next_session<T: Into<String>>(&self, reason: T) {
        *lock(&self.session_failure) = Some(reason.into());
    }

    /// Every call made on this device, in order
    pub fn calls(&self) -> Vec<TransportCall> {
        lock(&self.calls).clone()
    }

    // ------------------------------------------------------------------------
    // Device-scoped inspection
    // ------------------------------------------------------------------------

    pub fn active_sessions(&self) -> usize {
        let state = self.medium.lock();
        state.sessions.values().filter(|s| s.device == self.device).count()
    }

    pub fn active_publications(&self) -> usize {
        self.published_payloads().len()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.subscription_strategies().len()
    }

    /// Payloads this device is currently broadcasting
    pub fn published_payloads(&self) -> Vec<Payload> {
        let state = self.medium.lock();
        state
            .publications
            .values()
            .filter(|p| p.device == self.device)
            .map(|p| p.payload.clone())
            .collect()
    }

    pub fn publication_strategies(&self) -> Vec<DiscoveryStrategy> {
        let state = self.medium.lock();
        state
            .publications
            .values()
            .filter(|p| p.device == self.device)
            .map(|p| p.strategy)
            .collect()
    }

    pub fn subscription_strategies(&self) -> Vec<DiscoveryStrategy> {
        let state = self.medium.lock();
        state
            .subscriptions
            .values()
            .filter(|s| s.device == self.device)
            .map(|s| s.strategy)
            .collect()
    }

    /// Handlers of every subscription this device ever started
    pub fn subscription_handler_history(&self) -> Vec<MessageHandlers> {
        lock(&self.handler_history).clone()
    }

    /// Error handlers of every session this device ever opened
    pub fn session_handler_history(&self) -> Vec<SessionErrorHandlers> {
        lock(&self.session_history).clone()
    }

    // ------------------------------------------------------------------------
    // Callback injection
    // ------------------------------------------------------------------------

    /// Report `payload` as found to this device's subscriptions
    pub fn deliver_found(&self, payload: Payload) -> usize {
        self.own_subscribers()
            .iter()
            .filter(|handlers| handlers.message_found(payload.clone()))
            .count()
    }

    /// Report `payload` as lost to this device's subscriptions
    pub fn deliver_lost(&self, payload: Payload) -> usize {
        self.own_subscribers()
            .iter()
            .filter(|handlers| handlers.message_lost(payload.clone()))
            .count()
    }

    pub fn raise_bluetooth_power_error(&self, has_error: bool) {
        for handlers in self.own_session_handlers() {
            handlers.bluetooth_power_error(has_error);
        }
    }

    pub fn raise_microphone_permission_error(&self) {
        for handlers in self.own_session_handlers() {
            handlers.microphone_permission_error(true);
        }
    }

    pub fn raise_bluetooth_permission_error(&self) {
        for handlers in self.own_session_handlers() {
            handlers.bluetooth_permission_error(true);
        }
    }

    fn own_subscribers(&self) -> Vec<MessageHandlers> {
        let state = self.medium.lock();
        state
            .subscriptions
            .values()
            .filter(|s| s.device == self.device)
            .map(|s| s.handlers.clone())
            .collect()
    }

    fn own_session_handlers(&self) -> Vec<SessionErrorHandlers> {
        let state = self.medium.lock();
        state
            .sessions
            .values()
            .filter(|s| s.device == self.device)
            .map(|s| s.handlers.clone())
            .collect()
    }

    fn record(&self, call: TransportCall) {
        lock(&self.calls).push(call);
    }

    fn next_handle(&self) -> u64 {
        self.medium.allocate_id()
    }
}

impl DiscoveryTransport for MockDiscoveryTransport {
    fn set_debug_logging(&self, enabled: bool) {
        self.debug_logging.store(enabled, Ordering::SeqCst);
        self.record(TransportCall::SetDebugLogging(enabled));
    }

    fn has_required_permission(&self) -> bool {
        self.permission_granted.load(Ordering::SeqCst)
    }

    fn create_session(
        &self,
        _api_key: &ApiKey,
        handlers: SessionErrorHandlers,
    ) -> NearbyResult<SessionHandle> {
        if let Some(reason) = lock(&self.session_failure).take() {
            return Err(TransportError::SessionRejected { reason }.into());
        }

        let handle = SessionHandle::new(self.next_handle());
        lock(&self.session_history).push(handlers.clone());
        self.medium.lock().sessions.insert(
            handle,
            SessionRecord {
                device: self.device,
                handlers,
            },
        );
        debug!("Mock device {} opened {}", self.device, handle);
        self.record(TransportCall::CreateSession(handle));
        Ok(handle)
    }

    fn close_session(&self, session: SessionHandle) {
        let mut state = self.medium.lock();
        state.sessions.remove(&session);
        // Work left running on a closed session dies with it.
        state.publications.retain(|_, p| p.session != session);
        state.subscriptions.retain(|_, s| s.session != session);
        drop(state);
        self.record(TransportCall::CloseSession(session));
    }

    fn start_publication(
        &self,
        session: SessionHandle,
        payload: &Payload,
        strategy: DiscoveryStrategy,
    ) -> NearbyResult<PublicationHandle> {
        let handle = PublicationHandle::new(self.next_handle());
        let subscribers = {
            let mut state = self.medium.lock();
            if !state.sessions.contains_key(&session) {
                return Err(TransportError::PublicationRejected {
                    reason: format!("{} is not open", session),
                }
                .into());
            }
            state.publications.insert(
                handle,
                PublicationRecord {
                    device: self.device,
                    session,
                    payload: payload.clone(),
                    strategy,
                },
            );
            state.foreign_subscribers(self.device)
        };
        self.record(TransportCall::StartPublication(handle, payload.clone()));

        for handlers in subscribers {
            handlers.message_found(payload.clone());
        }
        Ok(handle)
    }

    fn stop_publication(&self, handle: PublicationHandle) {
        let stopped = {
            let mut state = self.medium.lock();
            state
                .publications
                .remove(&handle)
                .map(|record| (record.payload, state.foreign_subscribers(self.device)))
        };
        self.record(TransportCall::StopPublication(handle));

        if let Some((payload, subscribers)) = stopped {
            for handlers in subscribers {
                handlers.message_lost(payload.clone());
            }
        }
    }

    fn start_subscription(
        &self,
        session: SessionHandle,
        strategy: DiscoveryStrategy,
        handlers: MessageHandlers,
    ) -> NearbyResult<SubscriptionHandle> {
        let handle = SubscriptionHandle::new(self.next_handle());
        let on_air = {
            let mut state = self.medium.lock();
            if !state.sessions.contains_key(&session) {
                return Err(TransportError::SubscriptionRejected {
                    reason: format!("{} is not open", session),
                }
                .into());
            }
            state.subscriptions.insert(
                handle,
                SubscriptionRecord {
                    device: self.device,
                    session,
                    strategy,
                    handlers: handlers.clone(),
                },
            );
            state.foreign_payloads(self.device)
        };
        lock(&self.handler_history).push(handlers.clone());
        self.record(TransportCall::StartSubscription(handle));

        for payload in on_air {
            handlers.message_found(payload);
        }
        Ok(handle)
    }

    fn stop_subscription(&self, handle: SubscriptionHandle) {
        self.medium.lock().subscriptions.remove(&handle);
        self.record(TransportCall::StopSubscription(handle));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
