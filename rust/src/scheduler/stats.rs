//! Running counters for a scheduler.

use rustc_hash::FxHashMap;

use crate::models::TaskId;

/// Totals since the scheduler was built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub dispatches: u64,
    pub misses: u64,
    pub rollovers: u64,
    /// task_id -> deadline misses
    pub misses_by_task: FxHashMap<TaskId, u64>,
    /// task_id -> times dispatched
    pub dispatches_by_task: FxHashMap<TaskId, u64>,
}

impl SchedulerStats {
    pub fn record_miss(&mut self, id: TaskId) {
        self.misses += 1;
        *self.misses_by_task.entry(id).or_insert(0) += 1;
    }

    pub fn record_rollover(&mut self) {
        self.rollovers += 1;
    }

    pub fn record_dispatch(&mut self, id: TaskId) {
        self.dispatches += 1;
        *self.dispatches_by_task.entry(id).or_insert(0) += 1;
    }

    pub fn misses_for(&self, id: TaskId) -> u64 {
        self.misses_by_task.get(&id).copied().unwrap_or(0)
    }

    pub fn dispatches_for(&self, id: TaskId) -> u64 {
        self.dispatches_by_task.get(&id).copied().unwrap_or(0)
    }
}
