//! Position — the lifecycle engine's view of one open trade.
//!
//! Owned exclusively by the lifecycle state machine while open; the signal
//! evaluator and exit policy only ever see it read-only. All profit math is
//! a pure function of the entries and a current price.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::decision::Direction;

/// One executed entry: the initial fill or a grind addition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFill {
    pub price: f64,
    /// Stake (quote currency) committed at this fill.
    pub stake: f64,
    pub timestamp: DateTime<Utc>,
    /// Condition set that attributed this fill (entry tag number).
    pub condition_id: u32,
}

/// State of a single open position on one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub opened_at: DateTime<Utc>,
    pub direction: Direction,
    /// Ordered fills; the first is the opening entry, the rest are additions.
    pub entries: Vec<EntryFill>,
    /// Highest unrealized profit ever observed (monotone max, updated every
    /// timestep before the exit policy runs).
    pub peak_profit: f64,
    /// The position has at least one averaging addition.
    pub is_grinding: bool,
    /// Set when the catastrophic stop fired; the position is past saving.
    pub is_doomed: bool,
}

impl Position {
    /// Open a position from its first accepted fill.
    pub fn open(direction: Direction, fill: EntryFill) -> Self {
        Self {
            opened_at: fill.timestamp,
            direction,
            entries: vec![fill],
            peak_profit: 0.0,
            is_grinding: false,
            is_doomed: false,
        }
    }

    /// Record an accepted averaging addition.
    pub fn add_entry(&mut self, fill: EntryFill) {
        self.entries.push(fill);
        self.is_grinding = true;
    }

    /// Number of additions beyond the opening entry.
    pub fn additions(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Stake committed at the opening entry.
    pub fn initial_stake(&self) -> f64 {
        self.entries.first().map(|e| e.stake).unwrap_or(0.0)
    }

    /// Total stake committed across all fills.
    pub fn total_stake(&self) -> f64 {
        self.entries.iter().map(|e| e.stake).sum()
    }

    /// Stake-weighted average entry price.
    pub fn average_entry_price(&self) -> f64 {
        let total_stake = self.total_stake();
        let total_amount: f64 = self.entries.iter().map(|e| e.stake / e.price).sum();
        if total_amount > 0.0 {
            total_stake / total_amount
        } else {
            0.0
        }
    }

    /// Unrealized profit fraction at `price`, direction-aware.
    ///
    /// Long: `price / avg - 1`. Short: `1 - price / avg`.
    pub fn unrealized_profit(&self, price: f64) -> f64 {
        let avg = self.average_entry_price();
        if avg <= 0.0 {
            return 0.0;
        }
        (price / avg - 1.0) * self.direction.sign()
    }

    /// Current drawdown fraction (positive when the position is losing).
    pub fn drawdown(&self, price: f64) -> f64 {
        -self.unrealized_profit(price)
    }

    /// Fold a freshly observed profit into the peak (monotone max).
    pub fn observe_profit(&mut self, profit: f64) {
        if profit > self.peak_profit {
            self.peak_profit = profit;
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.opened_at
    }

    /// Timestamp of the most recent fill (initial or addition).
    pub fn last_entry_at(&self) -> DateTime<Utc> {
        self.entries
            .last()
            .map(|e| e.timestamp)
            .unwrap_or(self.opened_at)
    }
}
