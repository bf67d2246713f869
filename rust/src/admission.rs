//! Critical set admission under a utilization bound.
//!
//! Tasks are considered in ascending period order and admitted while the
//! running utilization stays strictly below the bound. The walk stops at the
//! first task that does not fit: later tasks are never admitted, even if one of
//! them would fit on its own. This is a shortest-period prefix, not a best fit.

use crate::clock::Millis;
use crate::models::{TaskId, TaskSet};

/// Outcome of one admission pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Admission {
    /// Every task as `(id, period)`, in the order admission considered them
    pub period_order: Vec<(TaskId, Millis)>,
    /// Admitted task ids, in admission order
    pub critical: Vec<TaskId>,
    /// The task that stopped the walk, if any
    pub first_rejected: Option<TaskId>,
    /// Sum of `length / period` over the admitted tasks
    pub total_utilization: f64,
}

impl Admission {
    pub fn is_critical(&self, id: TaskId) -> bool {
        self.critical.contains(&id)
    }
}

/// Indices into `tasks`, ascending by period and then by id.
fn period_order(tasks: &TaskSet) -> Vec<usize> {
    let slice = tasks.as_slice();
    let mut order: Vec<usize> = (0..slice.len()).collect();
    order.sort_by_key(|&i| (slice[i].period, slice[i].id));
    order
}

/// Mark the critical set on `tasks` and report what was admitted.
///
/// Criticality is assigned here and nowhere else; tasks not admitted are reset
/// to non-critical.
pub fn select_critical_set(tasks: &mut TaskSet, bound: f64) -> Admission {
    let order = period_order(tasks);
    let mut admission = Admission {
        period_order: order
            .iter()
            .map(|&i| {
                let t = &tasks.as_slice()[i];
                (t.id, t.period)
            })
            .collect(),
        ..Admission::default()
    };

    for task in tasks.iter_mut() {
        task.is_critical = false;
    }

    for position in order {
        let Some(task) = tasks.at_mut(position) else {
            continue;
        };
        let utilization = task.utilization();
        // NaN utilization or bound never fits
        let fits = admission.total_utilization + utilization < bound;
        if !fits {
            admission.first_rejected = Some(task.id);
            break;
        }
        task.is_critical = true;
        admission.total_utilization += utilization;
        admission.critical.push(task.id);
    }

    admission
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    fn set(tasks: &[(TaskId, Millis, Millis)]) -> TaskSet {
        TaskSet::new(
            tasks
                .iter()
                .map(|&(id, period, length)| Task::new(id, period, length))
                .collect(),
        )
        .unwrap()
    }

    fn critical_ids(tasks: &TaskSet) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = tasks.iter().filter(|t| t.is_critical).map(|t| t.id).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_all_tasks_fit() {
        let mut tasks = set(&[(0, 1000, 100), (1, 500, 100), (2, 2000, 200)]);
        let admission = select_critical_set(&mut tasks, 0.99);

        // 0.2 + 0.1 + 0.1
        assert_eq!(admission.critical, vec![1, 0, 2]);
        assert_eq!(admission.first_rejected, None);
        assert!((admission.total_utilization - 0.4).abs() < 1e-9);
        assert_eq!(critical_ids(&tasks), vec![0, 1, 2]);
    }

    #[test]
    fn test_stops_at_first_rejection() {
        // Period order: 0 (0.45), 1 (0.45), 2 (0.49), 3 (0.01).
        // Task 2 would overflow; task 3 would fit alone but is never considered.
        let mut tasks = set(&[(3, 2000, 20), (2, 1000, 490), (1, 400, 180), (0, 200, 90)]);
        let admission = select_critical_set(&mut tasks, 0.99);

        assert_eq!(admission.critical, vec![0, 1]);
        assert_eq!(admission.first_rejected, Some(2));
        assert!((admission.total_utilization - 0.9).abs() < 1e-9);
        assert_eq!(critical_ids(&tasks), vec![0, 1]);
        assert!(!tasks.get(3).unwrap().is_critical);
    }

    #[test]
    fn test_bound_is_strict() {
        // 0.5 + 0.25 == 0.75 is not below the bound
        let mut tasks = set(&[(0, 1000, 500), (1, 1000, 250)]);
        let admission = select_critical_set(&mut tasks, 0.75);
        assert_eq!(admission.critical, vec![0]);
        assert_eq!(admission.first_rejected, Some(1));
    }

    #[test]
    fn test_equal_periods_break_ties_by_id() {
        let mut tasks = set(&[(5, 800, 300), (2, 800, 300), (9, 800, 300)]);
        let admission = select_critical_set(&mut tasks, 0.99);

        assert_eq!(
            admission.period_order,
            vec![(2, 800), (5, 800), (9, 800)]
        );
        // 0.375 * 2 = 0.75, a third would be 1.125
        assert_eq!(admission.critical, vec![2, 5]);
        assert_eq!(admission.first_rejected, Some(9));
    }

    #[test]
    fn test_nan_bound_admits_nothing() {
        let mut tasks = set(&[(0, 1000, 100), (1, 2000, 100)]);
        let admission = select_critical_set(&mut tasks, f64::NAN);
        assert!(admission.critical.is_empty());
        assert_eq!(admission.first_rejected, Some(0));
        assert!(tasks.iter().all(|t| !t.is_critical));
    }

    #[test]
    fn test_oversized_first_task_admits_nothing() {
        let mut tasks = set(&[(0, 200, 199), (1, 2000, 50)]);
        let admission = select_critical_set(&mut tasks, 0.99);
        assert!(admission.critical.is_empty());
        assert_eq!(admission.first_rejected, Some(0));
        assert_eq!(admission.total_utilization, 0.0);
        assert!((tasks.critical_utilization()).abs() < 1e-12);
    }
}
