//! Channel Utilities
//!
//! Channel types shared by the gateway, the owner task and transport callbacks:
//! - bounded command channel (client → owner task)
//! - unbounded event channel (transport callbacks → client), so emitting never
//!   blocks a transport thread
//! - single-shot completions, one per command

use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicU64, Ordering};
use core::task::{Context, Poll};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::channel::communication::{Command, CommandKind, NearbyEvent, NearbyStatus};
use crate::config::ChannelConfig;
use crate::errors::{NearbyError, NearbyResult};

// ----------------------------------------------------------------------------
// Channel Type Definitions
// ----------------------------------------------------------------------------

pub type CommandSender = mpsc::Sender<CommandEnvelope>;
pub type CommandReceiver = mpsc::Receiver<CommandEnvelope>;
pub type EventReceiver = mpsc::UnboundedReceiver<NearbyEvent>;

// ----------------------------------------------------------------------------
// Completions
// ----------------------------------------------------------------------------

/// Sending half of a command's completion signal
///
/// `complete` takes `self`, so a command cannot be completed twice.
#[derive(Debug)]
pub struct Completion<T> {
    kind: CommandKind,
    sender: oneshot::Sender<NearbyResult<T>>,
}

impl<T> Completion<T> {
    /// Create a completion pair for a command of the given kind
    pub fn new(kind: CommandKind) -> (Self, CompletionReceiver<T>) {
        let (sender, receiver) = oneshot::channel();
        (Self { kind, sender }, CompletionReceiver { kind, receiver })
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Deliver the command's outcome
    pub fn complete(self, result: NearbyResult<T>) {
        if self.sender.send(result).is_err() {
            debug!("Caller stopped waiting for {} completion", self.kind);
        }
    }
}

/// Receiving half of a command's completion signal
#[derive(Debug)]
pub struct CompletionReceiver<T> {
    kind: CommandKind,
    receiver: oneshot::Receiver<NearbyResult<T>>,
}

impl<T> CompletionReceiver<T> {
    pub fn kind(&self) -> CommandKind {
        self.kind
    }
}

impl<T> Future for CompletionReceiver<T> {
    type Output = NearbyResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let kind = self.kind;
        Pin::new(&mut self.receiver).poll(cx).map(|outcome| match outcome {
            Ok(result) => result,
            Err(_) => Err(NearbyError::channel_error(format!(
                "{} completion was dropped without a result",
                kind
            ))),
        })
    }
}

/// Unit of work handed to the owner task
#[derive(Debug)]
pub enum CommandEnvelope {
    /// One of the six lifecycle commands
    Execute {
        command: Command,
        completion: Completion<()>,
    },
    /// Status snapshot request
    Status { completion: Completion<NearbyStatus> },
}

impl CommandEnvelope {
    pub fn kind(&self) -> CommandKind {
        match self {
            CommandEnvelope::Execute { command, .. } => command.kind(),
            CommandEnvelope::Status { .. } => CommandKind::Status,
        }
    }

    /// Fail the envelope without executing it
    pub fn reject(self, error: NearbyError) {
        match self {
            CommandEnvelope::Execute { completion, .. } => completion.complete(Err(error)),
            CommandEnvelope::Status { completion } => completion.complete(Err(error)),
        }
    }
}

// ----------------------------------------------------------------------------
// Event Sink
// ----------------------------------------------------------------------------

/// Event delivery statistics
#[derive(Debug, Default)]
pub struct EventStats {
    emitted: AtomicU64,
    dropped: AtomicU64,
}

impl EventStats {
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Events discarded because the client dropped its receiver
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Cloneable producer side of the event stream
///
/// Safe to call from any thread; sending never blocks.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: mpsc::UnboundedSender<NearbyEvent>,
    stats: Arc<EventStats>,
}

impl EventSink {
    /// Push an event onto the stream, returning whether a receiver accepted it
    pub fn emit(&self, event: NearbyEvent) -> bool {
        trace!("Routing event {}", event);
        match self.sender.send(event) {
            Ok(()) => {
                self.stats.emitted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::SendError(event)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Event receiver dropped, discarding {}", event.name());
                false
            }
        }
    }

    pub fn stats(&self) -> &EventStats {
        &self.stats
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

// ----------------------------------------------------------------------------
// Channel Creation Utilities
// ----------------------------------------------------------------------------

/// Create the bounded command channel (client → owner task)
pub fn create_command_channel(config: &ChannelConfig) -> (CommandSender, CommandReceiver) {
    mpsc::channel(config.command_buffer_size.max(1))
}

/// Create the event stream (transport callbacks → client)
pub fn create_event_channel() -> (EventSink, EventReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        EventSink {
            sender,
            stats: Arc::new(EventStats::default()),
        },
        receiver,
    )
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Payload;

    #[tokio::test]
    async fn test_completion_delivers_result() {
        let (completion, receiver) = Completion::<()>::new(CommandKind::Connect);
        assert_eq!(receiver.kind(), CommandKind::Connect);
        completion.complete(Ok(()));
        assert!(receiver.await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_completion_is_channel_error() {
        let (completion, receiver) = Completion::<()>::new(CommandKind::Publish);
        drop(completion);
        let err = receiver.await.unwrap_err();
        assert!(matches!(err, NearbyError::Channel { .. }));
        assert!(err.to_string().contains("publish"));
    }

    #[tokio::test]
    async fn test_reject_envelope() {
        let (completion, receiver) = Completion::new(CommandKind::Subscribe);
        let envelope = CommandEnvelope::Execute {
            command: Command::Subscribe,
            completion,
        };
        assert_eq!(envelope.kind(), CommandKind::Subscribe);
        envelope.reject(NearbyError::not_connected());
        assert!(receiver.await.is_err());
    }

    #[tokio::test]
    async fn test_event_sink_preserves_order() {
        let (sink, mut receiver) = create_event_channel();
        for text in ["a", "b", "c"] {
            assert!(sink.emit(NearbyEvent::MessageFound {
                message: Payload::from_text(text),
            }));
        }
        for text in ["a", "b", "c"] {
            let event = receiver.recv().await.unwrap();
            assert_eq!(event.message(), Some(&Payload::from_text(text)));
        }
        assert_eq!(sink.stats().emitted(), 3);
    }

    #[test]
    fn test_event_sink_counts_drops() {
        let (sink, receiver) = create_event_channel();
        drop(receiver);
        assert!(sink.is_closed());
        assert!(!sink.emit(NearbyEvent::BluetoothError { has_error: true }));
        assert_eq!(sink.stats().dropped(), 1);
        assert_eq!(sink.stats().emitted(), 0);
    }
}
