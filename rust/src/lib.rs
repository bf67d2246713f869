//! Least-laxity real-time scheduler model.
//!
//! A fixed set of periodic tasks is admitted into a critical set under a
//! utilization bound and then dispatched tick by tick, preferring ready, then
//! critical, then least-laxity tasks, on a single non-preemptive processor.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

pub mod admission;
pub mod clock;
mod config;
pub mod deadline;
pub mod dispatch;
pub mod executor;
pub mod generator;
pub mod logging;
mod models;
pub mod observer;
pub mod report;
pub mod scheduler;

pub use admission::{select_critical_set, Admission};
pub use clock::{Clock, Millis, VirtualClock, WallClock};
pub use config::SchedulerConfig;
pub use deadline::{Transition, TransitionRecord};
pub use dispatch::{dispatch_order, select_next, DispatchKey};
pub use executor::{Executor, SimulatedExecutor};
pub use generator::{GenerationError, RandomTaskGenerator, TaskSource};
pub use models::{Task, TaskId, TaskSet, TaskSetError};
pub use observer::{EventLog, NullObserver, SchedulerEvent, SchedulerObserver};
pub use report::{write_task_summary, TextReporter};
pub use scheduler::{Scheduler, SchedulerError, SchedulerStats, TickOutcome};

fn to_py_err(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Generate a random task set.
///
/// # Arguments
/// * `config` - Generation bounds (defaults to the fixed task model)
/// * `seed` - Seed for reproducible output; fresh entropy if omitted
///
/// # Raises
/// * ValueError if the configuration is invalid or a length range collapses
#[pyfunction]
#[pyo3(signature = (config=None, seed=None))]
fn generate_tasks(config: Option<SchedulerConfig>, seed: Option<u64>) -> PyResult<Vec<Task>> {
    let config = config.unwrap_or_default();
    let mut generator = match seed {
        Some(seed) => RandomTaskGenerator::seeded(seed),
        None => RandomTaskGenerator::from_entropy(),
    };
    generator.generate(&config).map_err(to_py_err)
}

/// Mark the critical set on a copy of `tasks`.
///
/// # Returns
/// * The tasks (same order) with `is_critical` assigned, and the total
///   critical utilization
///
/// # Raises
/// * ValueError if two tasks share an id, a task has a non-positive period or
///   length, or `bound` is outside (0, 1]
#[pyfunction]
#[pyo3(name = "select_critical_set", signature = (tasks, bound=0.99))]
fn py_select_critical_set(tasks: Vec<Task>, bound: f64) -> PyResult<(Vec<Task>, f64)> {
    SchedulerConfig {
        utilization_bound: bound,
        ..SchedulerConfig::default()
    }
    .validate()
    .map_err(to_py_err)?;
    let mut set = TaskSet::new(tasks).map_err(to_py_err)?;
    let admission = select_critical_set(&mut set, bound);
    Ok((set.into_vec(), admission.total_utilization))
}

/// Scheduler on a virtual clock, stepped from Python.
#[pyclass]
pub struct Simulation {
    inner: Scheduler<VirtualClock, SimulatedExecutor, EventLog>,
}

#[pymethods]
impl Simulation {
    #[new]
    #[pyo3(signature = (tasks, config=None, start_time=0))]
    fn new(tasks: Vec<Task>, config: Option<SchedulerConfig>, start_time: Millis) -> PyResult<Self> {
        let inner = Scheduler::new(
            tasks,
            config.unwrap_or_default(),
            VirtualClock::starting_at(start_time),
            SimulatedExecutor,
            EventLog::new(),
        )
        .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn tick(&mut self) -> PyResult<TickOutcome> {
        self.inner.tick().map_err(to_py_err)
    }

    fn run(&mut self, ticks: usize) -> PyResult<Vec<TickOutcome>> {
        self.inner.run_ticks(ticks).map_err(to_py_err)
    }

    fn run_until(&mut self, time: Millis) -> PyResult<Vec<TickOutcome>> {
        self.inner.run_until(time).map_err(to_py_err)
    }

    #[getter]
    fn tasks(&self) -> Vec<Task> {
        self.inner.tasks().as_slice().to_vec()
    }

    #[getter]
    fn now(&self) -> Millis {
        self.inner.now()
    }

    #[getter]
    fn critical_ids(&self) -> Vec<TaskId> {
        self.inner.admission().critical.clone()
    }

    #[getter]
    fn critical_utilization(&self) -> f64 {
        self.inner.admission().total_utilization
    }

    #[getter]
    fn misses(&self) -> u64 {
        self.inner.stats().misses
    }

    #[getter]
    fn dispatches(&self) -> u64 {
        self.inner.stats().dispatches
    }

    /// Tick-time events since the last call, as `(kind, task_id, time)` with
    /// kind one of "miss", "rollover", "dispatch".
    fn drain_events(&mut self) -> Vec<(String, TaskId, Millis)> {
        self.inner
            .observer_mut()
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                SchedulerEvent::Transition { now, id, missed } => {
                    let kind = if missed { "miss" } else { "rollover" };
                    Some((kind.to_string(), id, now))
                }
                SchedulerEvent::Dispatch { now, id } => Some(("dispatch".to_string(), id, now)),
                _ => None,
            })
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "Simulation(tasks={}, now={}, critical={:?})",
            self.inner.tasks().len(),
            self.inner.now(),
            self.inner.admission().critical
        )
    }
}

/// The laxsched.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Task>()?;
    m.add_class::<TickOutcome>()?;
    m.add_class::<Simulation>()?;

    // Config types
    m.add_class::<SchedulerConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(generate_tasks, m)?)?;
    m.add_function(wrap_pyfunction!(py_select_critical_set, m)?)?;

    Ok(())
}
