//! SigLab Core — multi-timeframe trading decision engine.
//!
//! This crate contains the heart of the decision pipeline:
//! - Domain types (snapshots, positions, decisions, timeframes)
//! - Informative-timeframe merge with a no-look-ahead contract
//! - Mode signal evaluator over data-driven condition catalogs
//! - Dynamic exit policy (doom stop, profit protection, reversal, ROI decay)
//! - DCA sizing engine with an ordered grind table
//! - Per-instrument position lifecycle state machine
//!
//! The core performs no I/O and holds no global state: all decisions are
//! pure functions of (position state, snapshot, static configuration), so
//! instruments evaluate in parallel without locking.

pub mod config;
pub mod data;
pub mod dca;
pub mod domain;
pub mod engine;
pub mod exits;
pub mod signals;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything crossing a worker boundary is
    /// Send + Sync. One engine runs per instrument per worker; if any of
    /// these types stops being Send, the parallel runner breaks loudly here.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Snapshot>();
        require_sync::<domain::Snapshot>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::EntryDecision>();
        require_sync::<domain::EntryDecision>();
        require_send::<domain::ExitDecision>();
        require_sync::<domain::ExitDecision>();
        require_send::<domain::AdjustmentDecision>();
        require_sync::<domain::AdjustmentDecision>();

        require_send::<signals::SignalCatalog>();
        require_sync::<signals::SignalCatalog>();
        require_send::<exits::ExitPolicy>();
        require_sync::<exits::ExitPolicy>();
        require_send::<dca::DcaPolicy>();
        require_sync::<dca::DcaPolicy>();

        require_send::<config::EngineConfig>();
        require_sync::<config::EngineConfig>();
        require_send::<engine::InstrumentEngine>();
        require_sync::<engine::InstrumentEngine>();
    }
}
