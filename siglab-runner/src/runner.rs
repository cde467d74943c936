//! Run orchestration — drives one engine per instrument over merged
//! snapshots, in parallel across the universe.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use siglab_core::config::{ConfigError, EngineConfig};
use siglab_core::data::AlignError;
use siglab_core::domain::Symbol;
use siglab_core::engine::{EngineError, InstrumentEngine, LifecycleState};

use crate::paper::{BrokerError, DecisionEvent, PaperBroker, TradeRecord};
use crate::scenario::InstrumentSeries;

/// Errors from a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("alignment error for {symbol}: {source}")]
    Align {
        symbol: Symbol,
        #[source]
        source: AlignError,
    },
    #[error("engine error for {symbol}: {source}")]
    Engine {
        symbol: Symbol,
        #[source]
        source: EngineError,
    },
}

/// Everything one instrument's run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentResult {
    pub symbol: Symbol,
    pub trades: Vec<TradeRecord>,
    pub decision_log: Vec<DecisionEvent>,
    pub snapshots_processed: usize,
    /// A position was still open when the data ran out.
    pub left_open: bool,
}

/// Run one instrument start to finish: merge its informative series, then
/// step the engine over every snapshot, filling decisions through the paper
/// broker.
pub fn run_instrument(
    series: &InstrumentSeries,
    config: &EngineConfig,
) -> Result<InstrumentResult, RunError> {
    let symbol = series.symbol.clone();
    let merged = series.merged().map_err(|source| RunError::Align {
        symbol: symbol.clone(),
        source,
    })?;

    let mut engine = InstrumentEngine::new(config.clone())?;
    let mut broker = PaperBroker::new(symbol.clone());

    for snapshot in &merged {
        let decision = engine.step(snapshot).map_err(|source| RunError::Engine {
            symbol: symbol.clone(),
            source,
        })?;
        match broker.apply(&mut engine, &decision, snapshot) {
            Ok(()) => {}
            Err(BrokerError::Engine(source)) => {
                return Err(RunError::Engine {
                    symbol: symbol.clone(),
                    source,
                })
            }
        }
    }

    let left_open = matches!(
        engine.state(),
        LifecycleState::Open { .. } | LifecycleState::Closing
    );
    let (trades, decision_log) = broker.into_books();

    Ok(InstrumentResult {
        symbol,
        trades,
        decision_log,
        snapshots_processed: merged.len(),
        left_open,
    })
}

/// Run every instrument in the universe in parallel.
///
/// Each instrument gets its own engine and broker; a worker touches exactly
/// one instrument's state at a time, so no locking is involved. Results come
/// back in input order.
pub fn run_universe(
    universe: &[InstrumentSeries],
    config: &EngineConfig,
) -> Result<Vec<InstrumentResult>, RunError> {
    config.validate()?;
    universe
        .par_iter()
        .map(|series| run_instrument(series, config))
        .collect()
}
