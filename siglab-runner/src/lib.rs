//! SigLab Runner — decision-engine orchestration over historical data.
//!
//! This crate builds on `siglab-core` to provide:
//! - TOML-loadable run configuration with content-addressable run ids
//! - A paper order layer filling decisions at the snapshot close
//! - Per-instrument run loops and a rayon-parallel universe runner
//! - Run summaries, CSV decision-log/trade exports, and JSON artifacts
//!
//! The core stays pure; everything with a filesystem or a thread pool in it
//! lives here.

pub mod paper;
pub mod report;
pub mod runner;
pub mod scenario;

pub use paper::{BrokerError, DecisionEvent, DecisionKind, PaperBroker, TradeRecord};
pub use report::{
    export_decision_log_csv, export_trades_csv, load_artifacts, save_artifacts, RunSummary,
};
pub use runner::{run_instrument, run_universe, InstrumentResult, RunError};
pub use scenario::{InstrumentSeries, RunConfig, RunId};
