//! Fire-and-forget notification sink.

use uuid::Uuid;

/// Events surfaced to operators. Delivery channels (email, push, toast) are
/// external; the pipeline never blocks on them.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    CircuitBreakerTripped {
        portfolio_id: String,
        reason: String,
    },
    CircuitBreakerReset {
        portfolio_id: String,
    },
    ExecutionFailed {
        portfolio_id: String,
        signal_id: Uuid,
        error: String,
    },
    BatchCompleted {
        portfolio_id: String,
        executed: usize,
        failed: usize,
        dry_run: bool,
    },
    TickFailed {
        portfolio_id: String,
        error: String,
    },
}

impl std::fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineEvent::CircuitBreakerTripped {
                portfolio_id,
                reason,
            } => write!(f, "circuit breaker tripped for {portfolio_id}: {reason}"),
            PipelineEvent::CircuitBreakerReset { portfolio_id } => {
                write!(f, "circuit breaker reset for {portfolio_id}")
            }
            PipelineEvent::ExecutionFailed {
                portfolio_id,
                signal_id,
                error,
            } => write!(
                f,
                "execution failed for signal {signal_id} in {portfolio_id}: {error}"
            ),
            PipelineEvent::BatchCompleted {
                portfolio_id,
                executed,
                failed,
                dry_run,
            } => write!(
                f,
                "batch completed for {portfolio_id}: {executed} executed, {failed} failed{}",
                if *dry_run { " (dry run)" } else { "" }
            ),
            PipelineEvent::TickFailed {
                portfolio_id,
                error,
            } => write!(f, "tick failed for {portfolio_id}: {error}"),
        }
    }
}

/// Trait for notification sinks. `notify` must never block.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: PipelineEvent);
}
