//! Simulated radio medium shared by mock devices

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use nearby_core::{
    DiscoveryStrategy, MessageHandlers, Payload, PublicationHandle, SessionErrorHandlers,
    SessionHandle, SubscriptionHandle,
};

// ----------------------------------------------------------------------------
// Medium Records
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct SessionRecord {
    pub device: u64,
    pub handlers: SessionErrorHandlers,
}

#[derive(Debug, Clone)]
pub(crate) struct PublicationRecord {
    pub device: u64,
    pub session: SessionHandle,
    pub payload: Payload,
    pub strategy: DiscoveryStrategy,
}

#[derive(Debug, Clone)]
pub(crate) struct SubscriptionRecord {
    pub device: u64,
    pub session: SessionHandle,
    pub strategy: DiscoveryStrategy,
    pub handlers: MessageHandlers,
}

#[derive(Debug, Default)]
pub(crate) struct MediumState {
    pub sessions: BTreeMap<SessionHandle, SessionRecord>,
    pub publications: BTreeMap<PublicationHandle, PublicationRecord>,
    pub subscriptions: BTreeMap<SubscriptionHandle, SubscriptionRecord>,
}

impl MediumState {
    /// Handlers of subscriptions held by devices other than `device`
    pub fn foreign_subscribers(&self, device: u64) -> Vec<MessageHandlers> {
        self.subscriptions
            .values()
            .filter(|sub| sub.device != device)
            .map(|sub| sub.handlers.clone())
            .collect()
    }

    /// Payloads published by devices other than `device`
    pub fn foreign_payloads(&self, device: u64) -> Vec<Payload> {
        self.publications
            .values()
            .filter(|publication| publication.device != device)
            .map(|publication| publication.payload.clone())
            .collect()
    }
}

// ----------------------------------------------------------------------------
// Simulated Medium
// ----------------------------------------------------------------------------

/// Radio space shared by every mock device attached to it
#[derive(Debug, Clone, Default)]
pub struct SimulatedMedium {
    state: Arc<Mutex<MediumState>>,
    next_id: Arc<AtomicU64>,
}

impl SimulatedMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a device id or transport handle
    pub(crate) fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, MediumState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of sessions open across all devices
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Number of publications running across all devices
    pub fn publication_count(&self) -> usize {
        self.lock().publications.len()
    }

    /// Number of subscriptions running across all devices
    pub fn subscription_count(&self) -> usize {
        self.lock().subscriptions.len()
    }

    /// Every payload currently on air
    pub fn payloads_on_air(&self) -> Vec<Payload> {
        self.lock()
            .publications
            .values()
            .map(|publication| publication.payload.clone())
            .collect()
    }
}
