//! Dispatch ordering: readiness, then criticality, then least laxity.
//!
//! The first-ranked task is always dispatched. There is no idle outcome: when
//! no task is ready the least-laxity non-ready task is run again.

use std::cmp::Ordering;

use crate::clock::Millis;
use crate::models::{Task, TaskId, TaskSet};

/// Dispatch key for one task.
///
/// Implements `Ord` so tasks can be ranked (lower = dispatched first). Ties
/// left after laxity go to the lower task id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchKey {
    pub is_ready: bool,
    pub is_critical: bool,
    pub laxity: Millis,
    pub task_id: TaskId,
}

impl DispatchKey {
    pub fn for_task(task: &Task) -> Self {
        Self {
            is_ready: task.is_ready,
            is_critical: task.is_critical,
            laxity: task.laxity,
            task_id: task.id,
        }
    }
}

impl Ord for DispatchKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // `true` sorts after `false`, so compare the flags reversed.
        other
            .is_ready
            .cmp(&self.is_ready)
            .then(other.is_critical.cmp(&self.is_critical))
            .then(self.laxity.cmp(&other.laxity))
            .then(self.task_id.cmp(&other.task_id))
    }
}

impl PartialOrd for DispatchKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Position (in set order) of the task to dispatch next.
///
/// `None` only for an empty set.
pub fn select_next(tasks: &TaskSet) -> Option<usize> {
    tasks
        .iter()
        .enumerate()
        .min_by_key(|(_, task)| DispatchKey::for_task(task))
        .map(|(position, _)| position)
}

/// Task ids in full dispatch order, most urgent first.
pub fn dispatch_order(tasks: &TaskSet) -> Vec<TaskId> {
    let mut keys: Vec<DispatchKey> = tasks.iter().map(DispatchKey::for_task).collect();
    keys.sort();
    keys.into_iter().map(|k| k.task_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: TaskId, is_ready: bool, is_critical: bool, laxity: Millis) -> Task {
        Task {
            is_ready,
            is_critical,
            laxity,
            ..Task::new(id, 1000, 100)
        }
    }

    fn selected(tasks: Vec<Task>) -> TaskId {
        let set = TaskSet::new(tasks).unwrap();
        let position = select_next(&set).unwrap();
        set.as_slice()[position].id
    }

    #[test]
    fn test_least_laxity_wins() {
        assert_eq!(
            selected(vec![task(0, true, true, 80), task(1, true, true, 30)]),
            1
        );
    }

    #[test]
    fn test_negative_laxity_is_most_urgent() {
        assert_eq!(
            selected(vec![task(0, true, true, 10), task(1, true, true, -5)]),
            1
        );
    }

    #[test]
    fn test_ready_beats_critical_and_laxity() {
        assert_eq!(
            selected(vec![task(0, false, true, -100), task(1, true, false, 900)]),
            1
        );
    }

    #[test]
    fn test_critical_beats_laxity() {
        assert_eq!(
            selected(vec![task(0, true, false, 1), task(1, true, true, 500)]),
            1
        );
    }

    #[test]
    fn test_non_critical_ties_still_use_laxity() {
        assert_eq!(
            selected(vec![task(0, true, false, 400), task(1, true, false, 20)]),
            1
        );
    }

    #[test]
    fn test_equal_keys_fall_back_to_id() {
        assert_eq!(
            selected(vec![task(4, true, true, 50), task(2, true, true, 50)]),
            2
        );
    }

    #[test]
    fn test_no_ready_task_still_dispatches() {
        assert_eq!(
            selected(vec![task(0, false, false, 300), task(1, false, false, 120)]),
            1
        );
    }

    #[test]
    fn test_empty_set_selects_nothing() {
        let set = TaskSet::new(vec![]).unwrap();
        assert_eq!(select_next(&set), None);
        assert!(dispatch_order(&set).is_empty());
    }

    #[test]
    fn test_full_dispatch_order() {
        let set = TaskSet::new(vec![
            task(0, false, true, 5),
            task(1, true, false, 10),
            task(2, true, true, 70),
            task(3, true, true, 40),
            task(4, false, false, 0),
        ])
        .unwrap();
        assert_eq!(dispatch_order(&set), vec![3, 2, 1, 0, 4]);
    }
}
