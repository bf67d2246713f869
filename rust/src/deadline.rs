//! Per-tick deadline tracking: the task state machine.
//!
//! A task is READY until dispatched and RUNNING (not ready) afterwards. Once
//! there is no longer room to run it before its deadline (`deadline <= now +
//! length`), the period ends: a task still READY has missed its deadline, a
//! RUNNING one simply rolls over. Either way the deadline moves one period
//! forward and the task is READY again.

use crate::clock::Millis;
use crate::models::{Task, TaskId, TaskSet};

/// What a single update did to a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Period ended without a dispatch. Deadline advanced, still ready.
    Missed,
    /// Period ended after a dispatch. Deadline advanced, ready again.
    Rollover,
    /// Deadline still feasible; laxity recomputed to this value.
    Slack(Millis),
}

impl Transition {
    pub fn is_miss(self) -> bool {
        matches!(self, Transition::Missed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionRecord {
    pub task_id: TaskId,
    pub transition: Transition,
}

/// Advance one task's state to time `now`.
///
/// Laxity is left untouched on miss and rollover ticks and may go negative
/// otherwise; a negative laxity alone is not a miss.
pub fn update(task: &mut Task, now: Millis) -> Transition {
    if task.deadline <= now + task.length {
        task.deadline += task.period;
        if task.is_ready {
            return Transition::Missed;
        }
        task.is_ready = true;
        return Transition::Rollover;
    }

    task.laxity = task.deadline - now - task.length;
    Transition::Slack(task.laxity)
}

/// Update every task, in set order. Returns one record per task.
pub fn update_all(tasks: &mut TaskSet, now: Millis) -> Vec<TransitionRecord> {
    tasks
        .iter_mut()
        .map(|task| TransitionRecord {
            task_id: task.id,
            transition: update(task, now),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(period: Millis, length: Millis, deadline: Millis, is_ready: bool) -> Task {
        Task {
            deadline,
            is_ready,
            ..Task::new(0, period, length)
        }
    }

    #[test]
    fn test_laxity_recomputed_while_feasible() {
        let mut t = task(1000, 200, 1000, true);
        assert_eq!(update(&mut t, 750), Transition::Slack(50));
        assert_eq!(t.laxity, 50);
        assert_eq!(t.deadline, 1000);
        assert!(t.is_ready);
    }

    #[test]
    fn test_ready_task_past_feasibility_misses() {
        let mut t = task(1000, 200, 1000, true);
        t.laxity = 50;
        assert_eq!(update(&mut t, 850), Transition::Missed);
        assert_eq!(t.deadline, 2000);
        assert!(t.is_ready);
        // laxity is stale on a miss tick
        assert_eq!(t.laxity, 50);
    }

    #[test]
    fn test_dispatched_task_rolls_over_without_miss() {
        let mut t = task(1000, 200, 2000, false);
        assert_eq!(update(&mut t, 1850), Transition::Rollover);
        assert_eq!(t.deadline, 3000);
        assert!(t.is_ready);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        // 1000 <= 800 + 200
        let mut t = task(1000, 200, 1000, true);
        assert_eq!(update(&mut t, 800), Transition::Missed);

        // 2000 <= 1799 + 200 is false
        let mut t = task(1000, 200, 2000, true);
        assert_eq!(update(&mut t, 1799), Transition::Slack(1));
    }

    #[test]
    fn test_only_one_period_per_update() {
        // Far behind the deadline: still advances by exactly one period.
        let mut t = task(500, 100, 500, true);
        assert_eq!(update(&mut t, 10_000), Transition::Missed);
        assert_eq!(t.deadline, 1000);
    }

    #[test]
    fn test_update_all_covers_every_task() {
        let mut tasks = TaskSet::new(vec![
            Task::new(0, 1000, 200),
            Task {
                deadline: 300,
                is_ready: false,
                ..Task::new(1, 300, 100)
            },
            Task::new(2, 250, 100),
        ])
        .unwrap();

        let records = update_all(&mut tasks, 200);
        assert_eq!(
            records,
            vec![
                TransitionRecord {
                    task_id: 0,
                    transition: Transition::Slack(600)
                },
                TransitionRecord {
                    task_id: 1,
                    transition: Transition::Rollover
                },
                TransitionRecord {
                    task_id: 2,
                    transition: Transition::Missed
                },
            ]
        );
        assert_eq!(tasks.get(1).unwrap().deadline, 600);
        assert_eq!(tasks.get(2).unwrap().deadline, 500);
    }
}
