//! Position lifecycle engine — per-instrument decision cycles.

pub mod lifecycle;

pub use lifecycle::{CycleDecision, EngineError, InstrumentEngine, LifecycleState};
