//! Tick-driven least-laxity scheduler.
//!
//! Each tick reads the clock, updates every task's deadline state, ranks the
//! tasks and runs exactly one of them to completion.

mod core;
mod stats;

pub use core::{Scheduler, SchedulerError, TickOutcome};
pub use stats::SchedulerStats;
