//! Notification sinks.
//!
//! The pipeline fires events and moves on; sinks forward them to whatever
//! delivery channel exists outside the core. Neither implementation here
//! can block the caller.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use autotrade_core::traits::{Notifier, PipelineEvent};

/// Sink that writes events to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: PipelineEvent) {
        match &event {
            PipelineEvent::CircuitBreakerTripped { .. }
            | PipelineEvent::ExecutionFailed { .. }
            | PipelineEvent::TickFailed { .. } => warn!(%event, "pipeline event"),
            PipelineEvent::CircuitBreakerReset { .. }
            | PipelineEvent::BatchCompleted { .. } => info!(%event, "pipeline event"),
        }
    }
}

/// Sink that forwards events onto an unbounded channel.
///
/// Used to bridge events to an external delivery service, and by tests as a
/// probe. If the receiver is gone, events are dropped silently.
pub struct ChannelNotifier {
    tx: UnboundedSender<PipelineEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let (notifier, mut rx) = ChannelNotifier::new();

        notifier.notify(PipelineEvent::CircuitBreakerTripped {
            portfolio_id: "p1".to_string(),
            reason: "drawdown".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, PipelineEvent::CircuitBreakerTripped { .. }));
    }

    #[test]
    fn test_notify_survives_dropped_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);

        // Must not panic or block
        notifier.notify(PipelineEvent::ExecutionFailed {
            portfolio_id: "p1".to_string(),
            signal_id: Uuid::new_v4(),
            error: "gone".to_string(),
        });
    }
}
