//! Core scheduler implementation.

use std::convert::Infallible;

use pyo3::prelude::*;
use thiserror::Error;

use crate::admission::{select_critical_set, Admission};
use crate::clock::{Clock, Millis};
use crate::config::SchedulerConfig;
use crate::deadline::{update_all, Transition};
use crate::dispatch::{dispatch_order, select_next};
use crate::executor::Executor;
use crate::generator::{GenerationError, TaskSource};
use crate::models::{Task, TaskId, TaskSet, TaskSetError};
use crate::observer::SchedulerObserver;
use crate::{log_changes, log_checks, log_debug};

use super::stats::SchedulerStats;

/// Errors that can occur during scheduling.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Task set is empty")]
    EmptyTaskSet,
    #[error(transparent)]
    TaskSet(#[from] TaskSetError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// What happened during one tick.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Clock reading at the start of the tick
    #[pyo3(get)]
    pub time: Millis,
    /// Task that was run
    #[pyo3(get)]
    pub dispatched: TaskId,
    /// Tasks whose deadline passed without a dispatch
    #[pyo3(get)]
    pub missed: Vec<TaskId>,
    /// Tasks whose period ended normally
    #[pyo3(get)]
    pub rolled_over: Vec<TaskId>,
}

#[pymethods]
impl TickOutcome {
    fn __repr__(&self) -> String {
        format!(
            "TickOutcome(time={}, dispatched={}, missed={:?}, rolled_over={:?})",
            self.time, self.dispatched, self.missed, self.rolled_over
        )
    }
}

/// Least-laxity scheduler over a statically admitted critical set.
///
/// Owns the task set exclusively. Criticality is fixed at construction; every
/// tick afterwards only touches deadlines, laxity and readiness.
pub struct Scheduler<C, E, O> {
    tasks: TaskSet,
    admission: Admission,
    config: SchedulerConfig,
    clock: C,
    executor: E,
    observer: O,
    stats: SchedulerStats,
}

impl<C: Clock, E: Executor, O: SchedulerObserver> Scheduler<C, E, O> {
    /// Build a scheduler over `tasks` and run admission.
    pub fn new(
        tasks: Vec<Task>,
        config: SchedulerConfig,
        clock: C,
        executor: E,
        mut observer: O,
    ) -> Result<Self, SchedulerError> {
        config.validate()?;
        if tasks.is_empty() {
            return Err(SchedulerError::EmptyTaskSet);
        }
        let mut tasks = TaskSet::new(tasks)?;
        let verbosity = config.verbosity;

        for task in &tasks {
            observer.on_task_created(task.id, task.period, task.length);
        }

        let admission = select_critical_set(&mut tasks, config.utilization_bound);
        observer.on_period_order(&admission.period_order);
        for &id in &admission.critical {
            log_checks!(verbosity, "  Task {} admitted to critical set", id);
            observer.on_admitted(id);
        }
        if let Some(id) = admission.first_rejected {
            log_checks!(
                verbosity,
                "  Task {} exceeds utilization bound {}, admission stopped",
                id,
                config.utilization_bound
            );
        }
        observer.on_admission_complete(admission.total_utilization);
        log_changes!(
            verbosity,
            "Critical set: {:?} (utilization {:.4})",
            admission.critical,
            admission.total_utilization
        );

        Ok(Self {
            tasks,
            admission,
            config,
            clock,
            executor,
            observer,
            stats: SchedulerStats::default(),
        })
    }

    /// Generate tasks from `source` and build a scheduler over them.
    pub fn from_source<S: TaskSource + ?Sized>(
        source: &mut S,
        config: SchedulerConfig,
        clock: C,
        executor: E,
        observer: O,
    ) -> Result<Self, SchedulerError> {
        let tasks = source.generate(&config)?;
        Self::new(tasks, config, clock, executor, observer)
    }

    /// Run one iteration: update every task, then dispatch exactly one.
    pub fn tick(&mut self) -> Result<TickOutcome, SchedulerError> {
        let verbosity = self.config.verbosity;
        let now = self.clock.now();
        let mut missed = Vec::new();
        let mut rolled_over = Vec::new();

        for record in update_all(&mut self.tasks, now) {
            let id = record.task_id;
            match record.transition {
                Transition::Missed => {
                    log_changes!(verbosity, "[{}] Task {} deadline missed", now, id);
                    self.stats.record_miss(id);
                    self.observer.on_transition(now, id, true);
                    missed.push(id);
                }
                Transition::Rollover => {
                    log_checks!(verbosity, "[{}] Task {} period rolled over", now, id);
                    self.stats.record_rollover();
                    self.observer.on_transition(now, id, false);
                    rolled_over.push(id);
                }
                Transition::Slack(laxity) => {
                    log_debug!(verbosity, "  Task {} laxity {}", id, laxity);
                }
            }
        }

        log_debug!(
            verbosity,
            "  Dispatch order: {:?}",
            dispatch_order(&self.tasks)
        );

        let task = select_next(&self.tasks)
            .and_then(|position| self.tasks.at_mut(position))
            .ok_or(SchedulerError::EmptyTaskSet)?;
        let id = task.id;
        if !task.is_ready {
            log_checks!(
                verbosity,
                "[{}] No ready task, running task {} again",
                now,
                id
            );
        }
        log_changes!(
            verbosity,
            "[{}] Executing task {} (laxity {})",
            now,
            id,
            task.laxity
        );

        self.observer.on_dispatch(now, id);
        self.executor.run(task, &mut self.clock);
        self.stats.record_dispatch(id);
        self.stats.ticks += 1;

        Ok(TickOutcome {
            time: now,
            dispatched: id,
            missed,
            rolled_over,
        })
    }

    /// Run exactly `ticks` iterations.
    pub fn run_ticks(&mut self, ticks: usize) -> Result<Vec<TickOutcome>, SchedulerError> {
        (0..ticks).map(|_| self.tick()).collect()
    }

    /// Run until the clock reads at least `time`.
    ///
    /// The last task started may finish past `time`.
    pub fn run_until(&mut self, time: Millis) -> Result<Vec<TickOutcome>, SchedulerError> {
        let mut outcomes = Vec::new();
        while self.clock.now() < time {
            outcomes.push(self.tick()?);
        }
        Ok(outcomes)
    }

    /// Run forever. Returns only on error.
    pub fn run(&mut self) -> Result<Infallible, SchedulerError> {
        loop {
            self.tick()?;
        }
    }

    pub fn tasks(&self) -> &TaskSet {
        &self.tasks
    }

    pub fn admission(&self) -> &Admission {
        &self.admission
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }
}
