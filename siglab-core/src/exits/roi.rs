//! ROI-over-time — the time-decaying minimum-profit step function.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// One step: from `age_minutes` onward, exiting requires `min_profit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiStep {
    pub age_minutes: i64,
    pub min_profit: f64,
}

/// Monotone non-increasing step function from position age to the minimum
/// profit fraction required to exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiTable {
    steps: Vec<RoiStep>,
}

impl RoiTable {
    /// Build a table. Shape violations surface at config validation, not
    /// here — but the steps are kept sorted by age so lookups stay simple.
    pub fn new(mut steps: Vec<RoiStep>) -> Self {
        steps.sort_by_key(|s| s.age_minutes);
        Self { steps }
    }

    /// The default schedule: 1% immediately, decaying to break-even after
    /// two hours.
    pub fn default_table() -> Self {
        Self::new(vec![
            RoiStep {
                age_minutes: 0,
                min_profit: 0.01,
            },
            RoiStep {
                age_minutes: 10,
                min_profit: 0.005,
            },
            RoiStep {
                age_minutes: 20,
                min_profit: 0.002,
            },
            RoiStep {
                age_minutes: 60,
                min_profit: 0.001,
            },
            RoiStep {
                age_minutes: 120,
                min_profit: 0.0,
            },
        ])
    }

    pub fn steps(&self) -> &[RoiStep] {
        &self.steps
    }

    /// Minimum profit required to exit at the given position age: the step
    /// with the greatest age threshold not exceeding `age`.
    ///
    /// Ages before the first step (only possible with a malformed table
    /// that skipped validation) fall back to the first step.
    pub fn required_profit(&self, age: Duration) -> f64 {
        let minutes = age.num_minutes();
        self.steps
            .iter()
            .rev()
            .find(|s| s.age_minutes <= minutes)
            .or_else(|| self.steps.first())
            .map(|s| s.min_profit)
            .unwrap_or(f64::INFINITY)
    }

    /// Config-load validation: non-empty, first step at age 0, strictly
    /// ascending ages, non-increasing profits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps.is_empty() {
            return Err(ConfigError::RoiTableEmpty);
        }
        if self.steps[0].age_minutes != 0 {
            return Err(ConfigError::RoiMissingBaseStep {
                first_age: self.steps[0].age_minutes,
            });
        }
        for pair in self.steps.windows(2) {
            if pair[1].age_minutes <= pair[0].age_minutes {
                return Err(ConfigError::RoiAgesNotAscending {
                    age: pair[1].age_minutes,
                });
            }
            if pair[1].min_profit > pair[0].min_profit {
                return Err(ConfigError::RoiProfitIncreasing {
                    age: pair[1].age_minutes,
                });
            }
        }
        for step in &self.steps {
            if !step.min_profit.is_finite() || step.min_profit < 0.0 {
                return Err(ConfigError::RoiProfitOutOfRange {
                    age: step.age_minutes,
                });
            }
        }
        Ok(())
    }
}
