//! Paper order layer.
//!
//! The core engine only decides; it never owns fills. This module plays the
//! external order layer during a historical run: every emitted decision is
//! filled at the snapshot close and confirmed back into the engine, and the
//! whole exchange is replaced by bookkeeping. Each broker serves exactly one
//! instrument, so a universe of brokers shares nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use siglab_core::domain::{Direction, EntryFill, ExitReason, Snapshot, Symbol};
use siglab_core::engine::{CycleDecision, EngineError, InstrumentEngine};

/// One closed round trip, recorded when the exit confirmation lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: Symbol,
    pub direction: Direction,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    /// Stake-weighted average entry price over all fills.
    pub entry_price: f64,
    pub exit_price: f64,
    /// Total stake across the opening fill and every grind addition.
    pub stake: f64,
    pub additions: usize,
    /// Profit fraction at exit decision time.
    pub profit: f64,
    pub entry_tag: String,
    pub exit_tag: String,
    pub exit_reason: ExitReason,
}

/// What a decision-log row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Entry,
    Adjustment,
    Exit,
    /// A decision lapsed because the snapshot had no usable close price.
    Lapsed,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Entry => "entry",
            DecisionKind::Adjustment => "adjustment",
            DecisionKind::Exit => "exit",
            DecisionKind::Lapsed => "lapsed",
        }
    }
}

/// One row of the audit trail: every decision the engine committed, with
/// the tag attributing it to the rule that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionEvent {
    pub symbol: Symbol,
    pub timestamp: DateTime<Utc>,
    pub kind: DecisionKind,
    pub tag: String,
    pub price: Option<f64>,
}

/// Paper-layer failures. Confirmation mismatches surface as engine errors;
/// the fill itself cannot fail.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Fills decisions at the snapshot close and keeps the books for one
/// instrument.
#[derive(Debug)]
pub struct PaperBroker {
    symbol: Symbol,
    trades: Vec<TradeRecord>,
    log: Vec<DecisionEvent>,
    open_tag: Option<String>,
}

impl PaperBroker {
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            trades: Vec::new(),
            log: Vec::new(),
            open_tag: None,
        }
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn decision_log(&self) -> &[DecisionEvent] {
        &self.log
    }

    pub fn into_books(self) -> (Vec<TradeRecord>, Vec<DecisionEvent>) {
        (self.trades, self.log)
    }

    /// Fill one cycle's decision and confirm it back into the engine.
    ///
    /// A decision against a snapshot with no close price lapses: it is
    /// logged but not filled. Only entries can lapse in practice (exit and
    /// adjustment decisions already required a close to be computed); a
    /// lapsed entry leaves the engine flat to re-decide next cycle.
    pub fn apply(
        &mut self,
        engine: &mut InstrumentEngine,
        decision: &CycleDecision,
        snapshot: &Snapshot,
    ) -> Result<(), BrokerError> {
        match decision {
            CycleDecision::None => Ok(()),
            CycleDecision::Enter(entry) => {
                let Some(price) = snapshot.close() else {
                    self.log_lapsed(snapshot.timestamp, &entry.tag);
                    return Ok(());
                };
                engine.confirm_entry(
                    entry.direction,
                    EntryFill {
                        price,
                        stake: engine.config().initial_stake,
                        timestamp: snapshot.timestamp,
                        condition_id: entry.condition_id,
                    },
                )?;
                self.open_tag = Some(entry.tag.clone());
                self.log(snapshot.timestamp, DecisionKind::Entry, &entry.tag, price);
                Ok(())
            }
            CycleDecision::Adjust(adjust) => {
                let Some(price) = snapshot.close() else {
                    self.log_lapsed(snapshot.timestamp, &adjust.tag);
                    return Ok(());
                };
                engine.confirm_addition(EntryFill {
                    price,
                    stake: adjust.amount,
                    timestamp: snapshot.timestamp,
                    condition_id: adjust.addition_index as u32,
                })?;
                self.log(
                    snapshot.timestamp,
                    DecisionKind::Adjustment,
                    &adjust.tag,
                    price,
                );
                Ok(())
            }
            CycleDecision::Exit(exit) => {
                let Some(price) = snapshot.close() else {
                    self.log_lapsed(snapshot.timestamp, &exit.tag);
                    return Ok(());
                };
                // The books need the position before the engine drops it.
                if let Some(position) = engine.position() {
                    self.trades.push(TradeRecord {
                        symbol: self.symbol.clone(),
                        direction: position.direction,
                        opened_at: position.opened_at,
                        closed_at: snapshot.timestamp,
                        entry_price: position.average_entry_price(),
                        exit_price: price,
                        stake: position.total_stake(),
                        additions: position.additions(),
                        profit: exit.profit,
                        entry_tag: self.open_tag.take().unwrap_or_default(),
                        exit_tag: exit.tag.clone(),
                        exit_reason: exit.reason,
                    });
                }
                engine.confirm_close()?;
                self.log(snapshot.timestamp, DecisionKind::Exit, &exit.tag, price);
                Ok(())
            }
        }
    }

    fn log(&mut self, timestamp: DateTime<Utc>, kind: DecisionKind, tag: &str, price: f64) {
        self.log.push(DecisionEvent {
            symbol: self.symbol.clone(),
            timestamp,
            kind,
            tag: tag.to_string(),
            price: Some(price),
        });
    }

    fn log_lapsed(&mut self, timestamp: DateTime<Utc>, tag: &str) {
        self.log.push(DecisionEvent {
            symbol: self.symbol.clone(),
            timestamp,
            kind: DecisionKind::Lapsed,
            tag: tag.to_string(),
            price: None,
        });
    }
}
