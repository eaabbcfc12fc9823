//! Core Task Implementation
//!
//! The core task is the single owner of [`CoreState`]. It takes command
//! envelopes off the command channel one at a time and completes each exactly
//! once. When asked to shut down, or when every gateway is gone, it tears the
//! session down before exiting.

use nearby_core::{channel::CommandReceiver, CommandEnvelope, NearbyError, NearbyResult};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::state::CoreState;

/// The task that owns and mutates all session state
pub struct CoreTask {
    state: CoreState,
    command_receiver: CommandReceiver,
    shutdown_receiver: oneshot::Receiver<()>,
}

impl CoreTask {
    pub fn new(
        state: CoreState,
        command_receiver: CommandReceiver,
        shutdown_receiver: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            state,
            command_receiver,
            shutdown_receiver,
        }
    }

    /// Run until shutdown is requested or the command channel closes
    pub async fn run(mut self) -> NearbyResult<()> {
        info!("Nearby core task starting");

        loop {
            tokio::select! {
                biased;

                _ = &mut self.shutdown_receiver => {
                    info!("Shutdown requested");
                    break;
                }

                envelope = self.command_receiver.recv() => {
                    match envelope {
                        Some(envelope) => self.handle(envelope),
                        None => {
                            info!("Command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        self.drain_pending();
        self.state.disconnect();
        info!(
            "Nearby core task stopped after {} commands",
            self.state.stats().commands_processed
        );
        Ok(())
    }

    fn handle(&mut self, envelope: CommandEnvelope) {
        let kind = envelope.kind();
        match envelope {
            CommandEnvelope::Execute {
                command,
                completion,
            } => {
                let result = self.state.execute(command);
                match &result {
                    Ok(()) => debug!("{} completed", kind),
                    Err(e) => warn!("{} rejected [{}]: {}", kind, kind.error_code(), e),
                }
                completion.complete(result);
            }
            CommandEnvelope::Status { completion } => {
                completion.complete(Ok(self.state.status()));
            }
        }
    }

    /// Reject whatever is still queued so no caller waits forever
    fn drain_pending(&mut self) {
        self.command_receiver.close();
        while let Ok(envelope) = self.command_receiver.try_recv() {
            let kind = envelope.kind();
            debug!("Rejecting queued {}", kind);
            envelope.reject(NearbyError::channel_error(format!(
                "runtime shut down before {} ran",
                kind
            )));
        }
    }
}
