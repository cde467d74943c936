//! DCA sizing — the ordered averaging ("grind") table.
//!
//! Additions are keyed by the *next* addition index: addition N+1 requires
//! both drawdown ≥ threshold[N+1] and no prior fill within that step's
//! cooldown. Indexes cannot be skipped — the lookup uses the count of
//! additions already realized. Sizes are clamped so the position's total
//! stake never exceeds the configured exposure cap; the catastrophic stop
//! is the safety valve when averaging cannot save the position.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::{AdjustmentDecision, Position};

/// One step of the grind table, for one addition index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcaStep {
    /// Minimum drawdown fraction (positive) to take this addition.
    pub drawdown: f64,
    /// Size = initial entry stake × this multiplier (before clamping).
    pub stake_multiplier: f64,
    /// Minimum minutes since the most recent fill.
    pub cooldown_minutes: i64,
}

/// Ascending table of grind steps, indexed by addition number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcaTable {
    steps: Vec<DcaStep>,
}

impl DcaTable {
    pub fn new(steps: Vec<DcaStep>) -> Self {
        Self { steps }
    }

    /// Default grind ladder: deeper drawdowns earn geometrically larger
    /// additions, with a growing cooldown.
    pub fn default_table() -> Self {
        Self::new(vec![
            DcaStep {
                drawdown: 0.05,
                stake_multiplier: 1.0,
                cooldown_minutes: 30,
            },
            DcaStep {
                drawdown: 0.15,
                stake_multiplier: 2.0,
                cooldown_minutes: 60,
            },
            DcaStep {
                drawdown: 0.25,
                stake_multiplier: 4.0,
                cooldown_minutes: 120,
            },
        ])
    }

    pub fn steps(&self) -> &[DcaStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Config-load validation: non-empty, strictly ascending drawdowns,
    /// positive thresholds and multipliers, non-negative cooldowns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps.is_empty() {
            return Err(ConfigError::DcaTableEmpty);
        }
        for (i, step) in self.steps.iter().enumerate() {
            if !(step.drawdown.is_finite() && step.drawdown > 0.0) {
                return Err(ConfigError::DcaBadThreshold { index: i });
            }
            if !(step.stake_multiplier.is_finite() && step.stake_multiplier > 0.0) {
                return Err(ConfigError::DcaBadMultiplier { index: i });
            }
            if step.cooldown_minutes < 0 {
                return Err(ConfigError::DcaBadCooldown { index: i });
            }
        }
        for (i, pair) in self.steps.windows(2).enumerate() {
            if pair[1].drawdown <= pair[0].drawdown {
                return Err(ConfigError::DcaNotAscending { index: i + 1 });
            }
        }
        Ok(())
    }
}

/// The sizing engine: table plus global caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcaPolicy {
    pub table: DcaTable,
    /// Hard cap on number of additions per position.
    pub max_additions: usize,
    /// Hard cap on total stake per position; sizes are clamped to fit.
    pub max_position_stake: f64,
}

impl DcaPolicy {
    /// Decide whether to add capital now, and how much.
    ///
    /// Pure: reads the position and price, produces at most one proposal.
    /// The addition is only realized when the external order layer confirms
    /// the fill.
    pub fn decide(
        &self,
        position: &Position,
        price: f64,
        now: DateTime<Utc>,
    ) -> Option<AdjustmentDecision> {
        let additions = position.additions();
        if additions >= self.max_additions {
            return None;
        }
        // Next addition index maps straight onto the table; running past
        // the table means no further additions.
        let step = self.table.steps().get(additions)?;

        if position.drawdown(price) < step.drawdown {
            return None;
        }
        if now - position.last_entry_at() < Duration::minutes(step.cooldown_minutes) {
            return None;
        }

        let proposed = position.initial_stake() * step.stake_multiplier;
        let room = self.max_position_stake - position.total_stake();
        let amount = proposed.min(room);
        if amount <= 0.0 {
            return None;
        }

        let addition_index = additions + 1;
        Some(AdjustmentDecision {
            amount,
            reference_price: price,
            addition_index,
            tag: format!("grind_{addition_index}"),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate()?;
        if self.max_additions == 0 {
            return Err(ConfigError::MaxAdditionsZero);
        }
        if !(self.max_position_stake.is_finite() && self.max_position_stake > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "max_position_stake",
            });
        }
        Ok(())
    }
}
