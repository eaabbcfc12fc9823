//! Command gateway
//!
//! Request/response entry points for the host client. Every command is sent
//! to the core task with its own single-shot completion, so it resolves
//! exactly once, independently of the event stream.

use nearby_core::channel::CommandSender;
use nearby_core::{
    ApiKey, Command, CommandEnvelope, CommandKind, Completion, CompletionReceiver, NearbyError,
    NearbyResult, NearbyStatus, Payload,
};
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// Cloneable handle for issuing commands
#[derive(Debug, Clone)]
pub struct CommandGateway {
    sender: CommandSender,
}

impl CommandGateway {
    pub fn new(sender: CommandSender) -> Self {
        Self { sender }
    }

    /// Queue a command and return its pending completion
    pub async fn dispatch(&self, command: Command) -> NearbyResult<CompletionReceiver<()>> {
        let (completion, receiver) = Completion::new(command.kind());
        debug!("Dispatching {}", command.kind());
        self.sender
            .send(CommandEnvelope::Execute {
                command,
                completion,
            })
            .await
            .map_err(|_| not_running())?;
        Ok(receiver)
    }

    /// Queue a command without waiting for channel capacity
    pub fn try_dispatch(&self, command: Command) -> NearbyResult<CompletionReceiver<()>> {
        let (completion, receiver) = Completion::new(command.kind());
        self.sender
            .try_send(CommandEnvelope::Execute {
                command,
                completion,
            })
            .map_err(|e| match e {
                TrySendError::Full(_) => NearbyError::channel_error("command channel is full"),
                TrySendError::Closed(_) => not_running(),
            })?;
        Ok(receiver)
    }

    /// Fire-and-forget: `on_complete` runs exactly once with the outcome
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F>(&self, command: Command, on_complete: F)
    where
        F: FnOnce(CommandKind, NearbyResult<()>) + Send + 'static,
    {
        let gateway = self.clone();
        let kind = command.kind();
        tokio::spawn(async move {
            let result = gateway.execute(command).await;
            on_complete(kind, result);
        });
    }

    /// Queue a command and wait for its completion
    pub async fn execute(&self, command: Command) -> NearbyResult<()> {
        self.dispatch(command).await?.await
    }

    pub async fn connect<K: Into<ApiKey>>(&self, api_key: K) -> NearbyResult<()> {
        self.execute(Command::Connect {
            api_key: api_key.into(),
        })
        .await
    }

    pub async fn disconnect(&self) -> NearbyResult<()> {
        self.execute(Command::Disconnect).await
    }

    pub async fn publish<P: Into<Payload>>(&self, message: P) -> NearbyResult<()> {
        self.execute(Command::Publish {
            message: message.into(),
        })
        .await
    }

    pub async fn unpublish(&self) -> NearbyResult<()> {
        self.execute(Command::Unpublish).await
    }

    pub async fn subscribe(&self) -> NearbyResult<()> {
        self.execute(Command::Subscribe).await
    }

    pub async fn unsubscribe(&self) -> NearbyResult<()> {
        self.execute(Command::Unsubscribe).await
    }

    /// Snapshot of connection, publication and subscription state
    pub async fn status(&self) -> NearbyResult<NearbyStatus> {
        let (completion, receiver) = Completion::new(CommandKind::Status);
        self.sender
            .send(CommandEnvelope::Status { completion })
            .await
            .map_err(|_| not_running())?;
        receiver.await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

fn not_running() -> NearbyError {
    NearbyError::channel_error("nearby runtime is not running")
}
