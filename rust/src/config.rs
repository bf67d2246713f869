//! Configuration for task generation and admission.

use pyo3::prelude::*;

use crate::clock::Millis;
use crate::generator::GenerationError;

/// Fixed scheduler parameters.
///
/// The defaults are the compiled-in task model: five tasks with periods in
/// `[200, 2000)` ms, lengths in `[50, period * 0.5)` ms, admitted under a 0.99
/// utilization bound.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Number of tasks to generate
    #[pyo3(get, set)]
    pub num_tasks: usize,
    /// Inclusive lower bound for generated periods (ms)
    #[pyo3(get, set)]
    pub min_period: Millis,
    /// Exclusive upper bound for generated periods (ms)
    #[pyo3(get, set)]
    pub max_period: Millis,
    /// Inclusive lower bound for generated lengths (ms)
    #[pyo3(get, set)]
    pub min_length: Millis,
    /// Exclusive upper bound for a task's length, as a fraction of its period
    #[pyo3(get, set)]
    pub max_length_ratio: f64,
    /// Critical set utilization must stay strictly below this
    #[pyo3(get, set)]
    pub utilization_bound: f64,
    /// Logging verbosity (see `logging`)
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            num_tasks: 5,
            min_period: 200,
            max_period: 2000,
            min_length: 50,
            max_length_ratio: 0.5,
            utilization_bound: 0.99,
            verbosity: 0,
        }
    }
}

impl SchedulerConfig {
    /// Check the parameters before they reach the generator.
    ///
    /// Collapsed per-task length ranges are not detected here; they depend on
    /// the sampled period and surface as `GenerationError::InvalidRange`.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.num_tasks == 0 {
            return Err(GenerationError::InvalidConfig(
                "num_tasks must be at least 1".to_string(),
            ));
        }
        if self.min_period <= 0 || self.max_period <= self.min_period {
            return Err(GenerationError::InvalidConfig(format!(
                "period range [{}, {}) is empty or non-positive",
                self.min_period, self.max_period
            )));
        }
        if self.min_length <= 0 {
            return Err(GenerationError::InvalidConfig(format!(
                "min_length must be positive, got {}",
                self.min_length
            )));
        }
        if !(self.max_length_ratio > 0.0 && self.max_length_ratio < 1.0) {
            return Err(GenerationError::InvalidConfig(format!(
                "max_length_ratio must be in (0, 1), got {}",
                self.max_length_ratio
            )));
        }
        if !(self.utilization_bound > 0.0 && self.utilization_bound <= 1.0) {
            return Err(GenerationError::InvalidConfig(format!(
                "utilization_bound must be in (0, 1], got {}",
                self.utilization_bound
            )));
        }
        Ok(())
    }
}

#[pymethods]
impl SchedulerConfig {
    #[new]
    #[pyo3(signature = (
        num_tasks=None,
        min_period=None,
        max_period=None,
        min_length=None,
        max_length_ratio=None,
        utilization_bound=None,
        verbosity=None
    ))]
    fn new(
        num_tasks: Option<usize>,
        min_period: Option<Millis>,
        max_period: Option<Millis>,
        min_length: Option<Millis>,
        max_length_ratio: Option<f64>,
        utilization_bound: Option<f64>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            num_tasks: num_tasks.unwrap_or(defaults.num_tasks),
            min_period: min_period.unwrap_or(defaults.min_period),
            max_period: max_period.unwrap_or(defaults.max_period),
            min_length: min_length.unwrap_or(defaults.min_length),
            max_length_ratio: max_length_ratio.unwrap_or(defaults.max_length_ratio),
            utilization_bound: utilization_bound.unwrap_or(defaults.utilization_bound),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SchedulerConfig(num_tasks={}, period=[{}, {}), min_length={}, bound={})",
            self.num_tasks,
            self.min_period,
            self.max_period,
            self.min_length,
            self.utilization_bound
        )
    }
}
