//! Dynamic exit policy.
//!
//! Four exit paths, evaluated once per timestep in fixed priority order:
//! catastrophic stop, profit protection, trend reversal, time-decayed ROI
//! target. Exactly one `ExitDecision` (or none) comes out. Peak profit is
//! updated by the lifecycle engine *before* this policy runs.

pub mod protection;
pub mod roi;

pub use protection::ProfitProtection;
pub use roi::{RoiStep, RoiTable};

use chrono::Duration;

use crate::domain::{ExitDecision, ExitReason, Position, Snapshot};
use crate::signals::SignalCatalog;

/// The full exit rule set for one instrument engine.
#[derive(Debug, Clone)]
pub struct ExitPolicy {
    pub roi: RoiTable,
    pub protection: ProfitProtection,
    /// Absolute loss floor; profit ≤ -floor fires the catastrophic stop.
    pub doom_floor: f64,
    /// Exit-scoped condition sets (trend reversal).
    pub reversal: SignalCatalog,
}

impl ExitPolicy {
    /// Evaluate the policy for an open position at one timestep.
    ///
    /// `age` is the position age at the snapshot's timestamp. Returns the
    /// single highest-priority fired reason; total, never errors.
    pub fn evaluate(
        &self,
        position: &Position,
        snapshot: &Snapshot,
        age: Duration,
    ) -> Option<ExitDecision> {
        // Without a price there is no profit to reason about; reversal rules
        // alone must not close a position we cannot even mark.
        let price = snapshot.close()?;
        let profit = position.unrealized_profit(price);

        // Catastrophic stop overrides everything, grind state included.
        if profit <= -self.doom_floor {
            return Some(ExitDecision {
                reason: ExitReason::CatastrophicStop,
                tag: ExitReason::CatastrophicStop.tag().to_string(),
                profit,
            });
        }

        // Locking gains pre-empts waiting for the nominal target.
        if self.protection.fires(position.peak_profit, profit) {
            return Some(ExitDecision {
                reason: ExitReason::ProfitProtection,
                tag: ExitReason::ProfitProtection.tag().to_string(),
                profit,
            });
        }

        // Risk-driven override: fires at any profit level.
        if let Some(hit) = self.reversal.evaluate_direction(snapshot, position.direction) {
            return Some(ExitDecision {
                reason: ExitReason::TrendReversal,
                tag: format!("{}_{}", ExitReason::TrendReversal.tag(), hit.condition_id),
                profit,
            });
        }

        // Baseline/terminal path: the time-decayed minimum-profit target.
        if profit >= self.roi.required_profit(age) {
            return Some(ExitDecision {
                reason: ExitReason::RoiTarget,
                tag: ExitReason::RoiTarget.tag().to_string(),
                profit,
            });
        }

        None
    }
}
