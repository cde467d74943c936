//! Decisions — the engine's only outputs.
//!
//! Every decision carries a human-readable audit tag attributing it to the
//! condition set or exit rule that produced it.

use serde::{Deserialize, Serialize};

/// Directional intent of a position or signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short. Profit math multiplies by this.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

/// The closed set of trading modes.
///
/// Each mode owns its own ordered condition-set list. When several modes
/// produce a candidate for the same timestep and direction, the fixed
/// priority order below arbitrates — never map iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeMode {
    /// Momentum-spike entries: fast, aggressive, first in priority.
    Rapid,
    /// Mean-reversion scalp entries.
    Scalp,
    /// Trend-following entries (the "normal" mode).
    Trend,
    /// Large-cap specific entries (majors behave differently in drawdowns).
    LargeCap,
    /// Entries tuned for positions expected to grind (average down).
    Rebuy,
}

impl TradeMode {
    /// All modes in priority order (highest first).
    pub const ALL: [TradeMode; 5] = [
        TradeMode::Rapid,
        TradeMode::Scalp,
        TradeMode::Trend,
        TradeMode::LargeCap,
        TradeMode::Rebuy,
    ];

    /// Cross-mode arbitration rank; lower wins.
    pub fn priority(&self) -> u8 {
        match self {
            TradeMode::Rapid => 0,
            TradeMode::Scalp => 1,
            TradeMode::Trend => 2,
            TradeMode::LargeCap => 3,
            TradeMode::Rebuy => 4,
        }
    }

    /// Stable tag prefix used in entry tags (e.g. `trend_1`).
    pub fn tag(&self) -> &'static str {
        match self {
            TradeMode::Rapid => "rapid",
            TradeMode::Scalp => "scalp",
            TradeMode::Trend => "trend",
            TradeMode::LargeCap => "large_cap",
            TradeMode::Rebuy => "rebuy",
        }
    }
}

/// Decision to open a new position, consumed by the external order layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDecision {
    pub direction: Direction,
    pub mode: TradeMode,
    /// Stable identifier of the winning condition set.
    pub condition_id: u32,
    /// The winning mode's priority rank, kept for audit.
    pub priority: u8,
    /// Audit tag, `{mode}_{condition_id}`.
    pub tag: String,
}

impl EntryDecision {
    pub fn new(direction: Direction, mode: TradeMode, condition_id: u32) -> Self {
        Self {
            direction,
            mode,
            condition_id,
            priority: mode.priority(),
            tag: format!("{}_{}", mode.tag(), condition_id),
        }
    }
}

/// Why an open position should close. Listed highest priority first;
/// reasons are mutually exclusive within one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Unconditional loss floor. Never suppressed by any other rule.
    CatastrophicStop,
    /// Peak profit retraced past the configured trigger.
    ProfitProtection,
    /// Exit-scoped condition set fired (momentum reversal etc.).
    TrendReversal,
    /// Time-decayed minimum-profit target reached.
    RoiTarget,
}

impl ExitReason {
    /// Arbitration rank; lower wins when several reasons fire at once.
    pub fn precedence(&self) -> u8 {
        match self {
            ExitReason::CatastrophicStop => 0,
            ExitReason::ProfitProtection => 1,
            ExitReason::TrendReversal => 2,
            ExitReason::RoiTarget => 3,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ExitReason::CatastrophicStop => "doom_stop",
            ExitReason::ProfitProtection => "profit_protection",
            ExitReason::TrendReversal => "trend_reversal",
            ExitReason::RoiTarget => "roi_target",
        }
    }
}

/// Decision to close an open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitDecision {
    pub reason: ExitReason,
    /// Audit tag; carries the condition id for trend-reversal exits.
    pub tag: String,
    /// Unrealized profit fraction at decision time.
    pub profit: f64,
}

/// Decision to add capital to an open position (grind / DCA).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentDecision {
    /// Stake to add, already clamped to the position exposure cap.
    pub amount: f64,
    /// Price the sizing was computed against.
    pub reference_price: f64,
    /// 1-based index of this addition in the position's history.
    pub addition_index: usize,
    /// Audit tag, `grind_{addition_index}`.
    pub tag: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_priority_matches_declared_order() {
        for (rank, mode) in TradeMode::ALL.iter().enumerate() {
            assert_eq!(mode.priority() as usize, rank);
        }
    }

    #[test]
    fn exit_reason_precedence_is_total() {
        let reasons = [
            ExitReason::CatastrophicStop,
            ExitReason::ProfitProtection,
            ExitReason::TrendReversal,
            ExitReason::RoiTarget,
        ];
        for pair in reasons.windows(2) {
            assert!(pair[0].precedence() < pair[1].precedence());
        }
    }

    #[test]
    fn entry_tag_combines_mode_and_id() {
        let entry = EntryDecision::new(Direction::Long, TradeMode::Trend, 1);
        assert_eq!(entry.tag, "trend_1");
        assert_eq!(entry.priority, TradeMode::Trend.priority());
    }

    #[test]
    fn direction_sign() {
        assert_eq!(Direction::Long.sign(), 1.0);
        assert_eq!(Direction::Short.sign(), -1.0);
        assert_eq!(Direction::Long.opposite(), Direction::Short);
    }
}
