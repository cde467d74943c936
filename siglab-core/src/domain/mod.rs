//! Domain types for the decision engine.

pub mod decision;
pub mod position;
pub mod snapshot;
pub mod timeframe;

pub use decision::{
    AdjustmentDecision, Direction, EntryDecision, ExitDecision, ExitReason, TradeMode,
};
pub use position::{EntryFill, Position};
pub use snapshot::Snapshot;
pub use timeframe::Timeframe;

/// Instrument identifier (exchange pair, e.g. "BTC/USDT").
pub type Symbol = String;
