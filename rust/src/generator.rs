//! Random task set generation.
//!
//! Generation is kept behind `TaskSource` so the scheduling logic can be
//! driven by literal task sets, and `RandomTaskGenerator` can be seeded for
//! reproducible runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::clock::Millis;
use crate::config::SchedulerConfig;
use crate::models::{Task, TaskId};

/// Errors that can occur while generating tasks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Invalid sampling range [{lower}, {upper}): upper bound must exceed lower bound")]
    InvalidRange { lower: Millis, upper: Millis },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Produces the task set a scheduler starts from.
pub trait TaskSource {
    fn generate(&mut self, config: &SchedulerConfig) -> Result<Vec<Task>, GenerationError>;
}

/// Draw a value uniformly from `[lower, upper)`.
///
/// Fails instead of sampling when the range has no width.
pub fn sample_range<R: Rng + ?Sized>(
    rng: &mut R,
    lower: Millis,
    upper: Millis,
) -> Result<Millis, GenerationError> {
    if upper <= lower {
        return Err(GenerationError::InvalidRange { lower, upper });
    }
    Ok(rng.gen_range(lower..upper))
}

/// Samples periods and lengths uniformly inside the configured bounds.
#[derive(Clone, Debug)]
pub struct RandomTaskGenerator {
    rng: StdRng,
}

impl RandomTaskGenerator {
    /// Deterministic generator: the same seed always yields the same tasks.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl TaskSource for RandomTaskGenerator {
    fn generate(&mut self, config: &SchedulerConfig) -> Result<Vec<Task>, GenerationError> {
        config.validate()?;

        let mut tasks = Vec::with_capacity(config.num_tasks);
        for i in 0..config.num_tasks {
            let id = TaskId::try_from(i).map_err(|_| {
                GenerationError::InvalidConfig(format!("too many tasks: {}", config.num_tasks))
            })?;
            let period = sample_range(&mut self.rng, config.min_period, config.max_period)?;
            // Truncates like an integer conversion; a small period can leave
            // this at or below min_length.
            let max_length = (period as f64 * config.max_length_ratio) as Millis;
            let length = sample_range(&mut self.rng, config.min_length, max_length)?;
            tasks.push(Task::new(id, period, length));
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tasks_respect_bounds() {
        let config = SchedulerConfig::default();
        let mut generator = RandomTaskGenerator::seeded(42);
        let tasks = generator.generate(&config).unwrap();

        assert_eq!(tasks.len(), 5);
        for (i, task) in tasks.iter().enumerate() {
            assert_eq!(task.id as usize, i);
            assert!((200..2000).contains(&task.period));
            assert!(task.length >= 50);
            assert!((task.length as f64) < task.period as f64 * 0.5);
            assert!(task.length < task.period);
            assert_eq!(task.deadline, task.period);
            assert!(task.is_ready);
            assert!(!task.is_critical);
        }
    }

    #[test]
    fn test_same_seed_same_tasks() {
        let config = SchedulerConfig::default();
        let a = RandomTaskGenerator::seeded(7).generate(&config).unwrap();
        let b = RandomTaskGenerator::seeded(7).generate(&config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_range_rejects_empty_range() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            sample_range(&mut rng, 50, 50),
            Err(GenerationError::InvalidRange {
                lower: 50,
                upper: 50
            })
        );
        assert!(sample_range(&mut rng, 50, 40).is_err());
        assert_eq!(sample_range(&mut rng, 50, 51), Ok(50));
    }

    #[test]
    fn test_collapsed_length_range_fails_fast() {
        // period in [60, 61) with ratio 0.5 gives a length range [50, 30)
        let config = SchedulerConfig {
            min_period: 60,
            max_period: 61,
            ..SchedulerConfig::default()
        };
        let result = RandomTaskGenerator::seeded(0).generate(&config);
        assert_eq!(
            result,
            Err(GenerationError::InvalidRange {
                lower: 50,
                upper: 30
            })
        );
    }

    #[test]
    fn test_invalid_config_is_rejected_before_sampling() {
        let config = SchedulerConfig {
            num_tasks: 0,
            ..SchedulerConfig::default()
        };
        assert!(matches!(
            RandomTaskGenerator::seeded(0).generate(&config),
            Err(GenerationError::InvalidConfig(_))
        ));
    }
}
