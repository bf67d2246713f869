//! Core data types for the scheduling system.

use pyo3::prelude::*;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::clock::Millis;

/// Stable task identity, assigned at creation.
pub type TaskId = u32;

/// Errors building a task set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskSetError {
    #[error("Duplicate task id: {0}")]
    DuplicateId(TaskId),
    #[error("Task {0} must have a positive period and length")]
    InvalidTask(TaskId),
}

/// One periodic real-time task.
///
/// `deadline` is absolute on the scheduler's clock and only ever grows by whole
/// periods. `is_ready` means "not yet dispatched in the current period".
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    #[pyo3(get)]
    pub id: TaskId,
    #[pyo3(get)]
    pub period: Millis,
    #[pyo3(get)]
    pub length: Millis,
    #[pyo3(get, set)]
    pub deadline: Millis,
    #[pyo3(get, set)]
    pub laxity: Millis,
    #[pyo3(get)]
    pub is_critical: bool,
    #[pyo3(get, set)]
    pub is_ready: bool,
}

impl Task {
    /// First deadline is one period after time 0; laxity starts at its value
    /// for time 0.
    pub fn new(id: TaskId, period: Millis, length: Millis) -> Self {
        Self {
            id,
            period,
            length,
            deadline: period,
            laxity: period - length,
            is_critical: false,
            is_ready: true,
        }
    }

    /// Fraction of the processor this task needs: `length / period`.
    pub fn utilization(&self) -> f64 {
        self.length as f64 / self.period as f64
    }
}

#[pymethods]
impl Task {
    #[new]
    fn py_new(id: TaskId, period: Millis, length: Millis) -> Self {
        Self::new(id, period, length)
    }

    #[getter(utilization)]
    fn py_utilization(&self) -> f64 {
        self.utilization()
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={}, period={}, length={}, deadline={}, laxity={}, critical={}, ready={})",
            self.id,
            self.period,
            self.length,
            self.deadline,
            self.laxity,
            self.is_critical,
            self.is_ready
        )
    }
}

/// Ordered collection of tasks, kept in creation order.
#[derive(Clone, Debug, Default)]
pub struct TaskSet {
    tasks: Vec<Task>,
    index: FxHashMap<TaskId, usize>,
}

impl TaskSet {
    pub fn new(tasks: Vec<Task>) -> Result<Self, TaskSetError> {
        let mut index = FxHashMap::with_capacity_and_hasher(tasks.len(), Default::default());
        for (i, task) in tasks.iter().enumerate() {
            if task.period <= 0 || task.length <= 0 {
                return Err(TaskSetError::InvalidTask(task.id));
            }
            if index.insert(task.id, i).is_some() {
                return Err(TaskSetError::DuplicateId(task.id));
            }
        }
        Ok(Self { tasks, index })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.index.get(&id).map(|&i| &self.tasks[i])
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.index.get(&id).map(|&i| &mut self.tasks[i])
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Task> {
        self.tasks.iter_mut()
    }

    /// Task at a position in creation order.
    pub fn at_mut(&mut self, position: usize) -> Option<&mut Task> {
        self.tasks.get_mut(position)
    }

    /// Sum of utilization over the critical tasks.
    pub fn critical_utilization(&self) -> f64 {
        self.tasks
            .iter()
            .filter(|t| t.is_critical)
            .map(Task::utilization)
            .sum()
    }

    pub fn into_vec(self) -> Vec<Task> {
        self.tasks
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
