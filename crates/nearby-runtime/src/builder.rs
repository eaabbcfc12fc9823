//! Runtime Builder API
//!
//! Provides a builder-style API for hosts (CLI, bindings, tests) to attach a
//! discovery transport and get back command and event handles.

use std::sync::Arc;

use nearby_core::channel::create_command_channel;
use nearby_core::{DiscoveryTransport, EventReceiver, NearbyConfig, NearbyError, NearbyResult};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn, Level};

use crate::gateway::CommandGateway;
use crate::logic::{CoreState, CoreTask};
use crate::router::EventRouter;

// ----------------------------------------------------------------------------
// Runtime Builder
// ----------------------------------------------------------------------------

/// Builder for a nearby messaging runtime
pub struct RuntimeBuilder {
    transport: Arc<dyn DiscoveryTransport>,
    config: NearbyConfig,
    console_log_level: Option<Level>,
}

impl RuntimeBuilder {
    pub fn new(transport: Arc<dyn DiscoveryTransport>) -> Self {
        Self {
            transport,
            config: NearbyConfig::default(),
            console_log_level: None,
        }
    }

    /// Set the runtime configuration
    pub fn with_config(mut self, config: NearbyConfig) -> Self {
        self.config = config;
        self
    }

    /// Forward transport debug logging on connect
    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.config.debug_logging = enabled;
        self
    }

    /// Set the command channel buffer size
    pub fn command_buffer_size(mut self, size: usize) -> Self {
        self.config.channels.command_buffer_size = size;
        self
    }

    /// Install a console subscriber at `level` when the runtime starts
    pub fn with_console_logging(mut self, level: Level) -> Self {
        self.console_log_level = Some(level);
        self
    }

    /// Leave subscriber setup to the host
    pub fn with_no_logging(mut self) -> Self {
        self.console_log_level = None;
        self
    }

    /// Build and start the runtime. Must be called within a tokio runtime.
    pub async fn build_and_start(self) -> NearbyResult<RuntimeHandle> {
        self.config.validate()?;

        if let Some(level) = self.console_log_level {
            if tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .try_init()
                .is_err()
            {
                warn!("A global tracing subscriber is already installed");
            }
        }

        info!("Building nearby runtime");

        let (command_sender, command_receiver) = create_command_channel(&self.config.channels);
        let (shutdown_sender, shutdown_receiver) = oneshot::channel();

        let mut router = EventRouter::new();
        let event_receiver = router
            .take_receiver()
            .ok_or_else(|| NearbyError::channel_error("event receiver already taken"))?;

        let state = CoreState::new(self.transport, router, &self.config);
        let task = CoreTask::new(state, command_receiver, shutdown_receiver);
        let task_handle = tokio::spawn(task.run());

        info!("Nearby runtime started");

        Ok(RuntimeHandle {
            gateway: CommandGateway::new(command_sender),
            event_receiver: Some(event_receiver),
            shutdown_sender: Some(shutdown_sender),
            task_handle: Some(task_handle),
        })
    }
}

// ----------------------------------------------------------------------------
// Runtime Handle
// ----------------------------------------------------------------------------

/// Handle to a running nearby runtime
///
/// Dropping the handle stops the core task, which disconnects on the way out.
pub struct RuntimeHandle {
    gateway: CommandGateway,
    event_receiver: Option<EventReceiver>,
    shutdown_sender: Option<oneshot::Sender<()>>,
    task_handle: Option<JoinHandle<NearbyResult<()>>>,
}

impl RuntimeHandle {
    /// Command entry points; clone freely
    pub fn gateway(&self) -> &CommandGateway {
        &self.gateway
    }

    /// Take the event stream. Only the first call gets it.
    pub fn take_event_receiver(&mut self) -> Option<EventReceiver> {
        self.event_receiver.take()
    }

    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop the core task and wait for its teardown
    pub async fn shutdown(&mut self) -> NearbyResult<()> {
        if let Some(sender) = self.shutdown_sender.take() {
            let _ = sender.send(());
        }

        match self.task_handle.take() {
            Some(handle) => handle
                .await
                .map_err(|e| NearbyError::channel_error(format!("core task failed: {}", e)))?,
            None => Ok(()),
        }
    }
}
