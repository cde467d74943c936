//! Position lifecycle — one state machine per instrument.
//!
//! `PendingOpen → Open(n additions) → Closing → Closed`, additions only
//! moving forward within Open. One atomic decision cycle per timestep:
//! peak profit first, then exit evaluation, then DCA, then (when flat)
//! entry evaluation. Exit and addition are mutually exclusive in one cycle
//! and exit is always checked first — closing takes priority over adding
//! risk.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::dca::DcaPolicy;
use crate::domain::{
    AdjustmentDecision, Direction, EntryDecision, EntryFill, ExitDecision, ExitReason, Position,
    Snapshot,
};
use crate::exits::ExitPolicy;
use crate::signals::resolve;

/// Lifecycle states of the (at most one) position this engine manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Flat: scanning for entries, or an emitted entry awaits acceptance.
    PendingOpen,
    /// Position open with `additions` realized grind entries.
    Open { additions: usize },
    /// An exit decision was emitted; awaiting close confirmation.
    Closing,
    /// Position closed. The next cycle starts a fresh lifecycle.
    Closed,
}

/// The single decision (or none) committed in one evaluation cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleDecision {
    None,
    Enter(EntryDecision),
    Adjust(AdjustmentDecision),
    Exit(ExitDecision),
}

/// Caller-side protocol violations. Evaluation itself is total; these only
/// fire when snapshots arrive out of order or confirmations do not match
/// the state machine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("snapshot at {next} is not after the previous timestep {last}")]
    OutOfOrderSnapshot {
        last: DateTime<Utc>,
        next: DateTime<Utc>,
    },

    #[error("cannot {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

impl LifecycleState {
    fn name(&self) -> &'static str {
        match self {
            LifecycleState::PendingOpen => "pending-open",
            LifecycleState::Open { .. } => "open",
            LifecycleState::Closing => "closing",
            LifecycleState::Closed => "closed",
        }
    }
}

/// Decision engine for a single instrument.
///
/// Owns the position for the duration it is open. Holds no other state
/// between timesteps: every decision is a pure function of (position,
/// snapshot, config). One engine per instrument per worker; engines share
/// nothing, so a universe of instruments parallelizes without locks.
pub struct InstrumentEngine {
    config: EngineConfig,
    exit_policy: ExitPolicy,
    dca_policy: DcaPolicy,
    state: LifecycleState,
    position: Option<Position>,
    last_timestep: Option<DateTime<Utc>>,
}

impl InstrumentEngine {
    /// Build an engine, rejecting invalid configuration up front.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let exit_policy = config.exit_policy();
        let dca_policy = config.dca_policy();
        Ok(Self {
            config,
            exit_policy,
            dca_policy,
            state: LifecycleState::PendingOpen,
            position: None,
            last_timestep: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Run one atomic decision cycle against the next snapshot.
    ///
    /// Timesteps must be strictly increasing. At most one decision comes
    /// out; it is committed only when the external order layer confirms it
    /// via `confirm_entry` / `confirm_addition` / `confirm_close`.
    pub fn step(&mut self, snapshot: &Snapshot) -> Result<CycleDecision, EngineError> {
        if let Some(last) = self.last_timestep {
            if snapshot.timestamp <= last {
                return Err(EngineError::OutOfOrderSnapshot {
                    last,
                    next: snapshot.timestamp,
                });
            }
        }
        self.last_timestep = Some(snapshot.timestamp);

        // A closed lifecycle rolls over to a fresh one.
        if self.state == LifecycleState::Closed {
            self.state = LifecycleState::PendingOpen;
        }

        match self.state {
            LifecycleState::Open { .. } => Ok(self.step_open(snapshot)),
            LifecycleState::PendingOpen => Ok(self.step_flat(snapshot)),
            // Waiting for the order layer; nothing to decide.
            LifecycleState::Closing | LifecycleState::Closed => Ok(CycleDecision::None),
        }
    }

    fn step_open(&mut self, snapshot: &Snapshot) -> CycleDecision {
        let position = self
            .position
            .as_mut()
            .expect("state Open implies a position");

        // Peak profit must be current before profit-protection runs.
        if let Some(price) = snapshot.close() {
            let profit = position.unrealized_profit(price);
            position.observe_profit(profit);
        }

        let age = position.age(snapshot.timestamp);
        if let Some(exit) = self.exit_policy.evaluate(position, snapshot, age) {
            if exit.reason == ExitReason::CatastrophicStop {
                position.is_doomed = true;
            }
            self.state = LifecycleState::Closing;
            return CycleDecision::Exit(exit);
        }

        // Exit declined to fire; averaging is the only other option.
        if let Some(price) = snapshot.close() {
            if let Some(adjust) = self.dca_policy.decide(position, price, snapshot.timestamp) {
                return CycleDecision::Adjust(adjust);
            }
        }

        CycleDecision::None
    }

    fn step_flat(&mut self, snapshot: &Snapshot) -> CycleDecision {
        let candidates = self
            .config
            .entries
            .evaluate(snapshot, &self.config.enabled_modes);
        match resolve(&candidates, self.config.conflict_policy) {
            Some(entry) => CycleDecision::Enter(entry),
            None => CycleDecision::None,
        }
    }

    /// The order layer accepted an entry decision and filled it.
    pub fn confirm_entry(
        &mut self,
        direction: Direction,
        fill: EntryFill,
    ) -> Result<(), EngineError> {
        if self.state != LifecycleState::PendingOpen || self.position.is_some() {
            return Err(EngineError::InvalidTransition {
                state: self.state.name(),
                event: "confirm entry",
            });
        }
        self.position = Some(Position::open(direction, fill));
        self.state = LifecycleState::Open { additions: 0 };
        Ok(())
    }

    /// The order layer accepted an adjustment decision and filled it.
    pub fn confirm_addition(&mut self, fill: EntryFill) -> Result<(), EngineError> {
        match (&mut self.position, self.state) {
            (Some(position), LifecycleState::Open { .. }) => {
                position.add_entry(fill);
                self.state = LifecycleState::Open {
                    additions: position.additions(),
                };
                Ok(())
            }
            _ => Err(EngineError::InvalidTransition {
                state: self.state.name(),
                event: "confirm addition",
            }),
        }
    }

    /// The order layer closed the position (after an exit decision).
    pub fn confirm_close(&mut self) -> Result<(), EngineError> {
        if self.state != LifecycleState::Closing {
            return Err(EngineError::InvalidTransition {
                state: self.state.name(),
                event: "confirm close",
            });
        }
        self.position = None;
        self.state = LifecycleState::Closed;
        Ok(())
    }

    /// External forced-liquidation notification: drop any open position
    /// immediately, whatever the state.
    pub fn force_close(&mut self) {
        self.position = None;
        self.state = LifecycleState::Closed;
    }
}
