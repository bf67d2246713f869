//! Task execution: non-preemptive, holds the processor for the task's length.

use crate::clock::Clock;
use crate::models::Task;

/// Runs a dispatched task to completion.
pub trait Executor {
    /// Mark `task` dispatched for its current period and hold the processor
    /// for its length. Returns only once the task has finished.
    fn run(&mut self, task: &mut Task, clock: &mut dyn Clock);
}

/// Executes by advancing the clock by the task's length.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedExecutor;

impl Executor for SimulatedExecutor {
    fn run(&mut self, task: &mut Task, clock: &mut dyn Clock) {
        task.is_ready = false;
        clock.advance(task.length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;

    #[test]
    fn test_run_clears_ready_and_advances_clock() {
        let mut clock = VirtualClock::starting_at(100);
        let mut task = Task::new(0, 1000, 200);

        SimulatedExecutor.run(&mut task, &mut clock);

        assert!(!task.is_ready);
        assert_eq!(clock.now(), 300);
        // deadline untouched until the next tracker update
        assert_eq!(task.deadline, 1000);
    }
}
