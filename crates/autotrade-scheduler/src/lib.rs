//! Automation scheduler.
//!
//! Runs one periodic evaluation loop per enabled portfolio. Within a
//! portfolio ticks are strictly sequential, enforced by a per-portfolio
//! exclusion token that ad hoc operator actions share; across portfolios
//! loops are fully independent. Disabling automation stops scheduling
//! immediately while letting an in-flight tick finish.

mod pipeline;
mod scheduler;

pub use pipeline::{TickPipeline, TickReport};
pub use scheduler::AutomationScheduler;
