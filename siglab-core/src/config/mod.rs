//! Static engine configuration.
//!
//! Everything the engine reads at runtime is validated here, once, at load
//! time. Runtime evaluation is total: after `validate()` passes, no code
//! path in the engine returns an error for data reasons.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dca::{DcaPolicy, DcaTable};
use crate::domain::{Direction, TradeMode};
use crate::exits::{ExitPolicy, ProfitProtection, RoiTable};
use crate::signals::{default_entry_catalog, default_exit_catalog, ConflictPolicy, SignalCatalog};

/// Configuration violation, reported at load time with enough context to
/// fix the offending table entry.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("ROI table is empty")]
    RoiTableEmpty,

    #[error("ROI table must start at age 0 (first step is at {first_age} minutes)")]
    RoiMissingBaseStep { first_age: i64 },

    #[error("ROI table ages must be strictly ascending (violated at {age} minutes)")]
    RoiAgesNotAscending { age: i64 },

    #[error("ROI required profit must be non-increasing with age (violated at {age} minutes)")]
    RoiProfitIncreasing { age: i64 },

    #[error("ROI required profit out of range at {age} minutes")]
    RoiProfitOutOfRange { age: i64 },

    #[error("DCA table is empty")]
    DcaTableEmpty,

    #[error("DCA drawdown thresholds must be strictly ascending (violated at step {index})")]
    DcaNotAscending { index: usize },

    #[error("DCA step {index} has a non-positive drawdown threshold")]
    DcaBadThreshold { index: usize },

    #[error("DCA step {index} has a non-positive stake multiplier")]
    DcaBadMultiplier { index: usize },

    #[error("DCA step {index} has a negative cooldown")]
    DcaBadCooldown { index: usize },

    #[error("max_additions must be at least 1")]
    MaxAdditionsZero,

    #[error("{field} must be a positive finite number")]
    NonPositive { field: &'static str },

    #[error("duplicate condition id {id} in {mode:?}/{direction:?} of the {catalog} catalog")]
    DuplicateConditionId {
        catalog: &'static str,
        mode: TradeMode,
        direction: Direction,
        id: u32,
    },

    #[error("no modes enabled")]
    NoModesEnabled,
}

/// Deterministic identity of a configuration, for audit and reproducibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigHash(String);

impl ConfigHash {
    fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The full static configuration of one instrument engine.
///
/// Read-only to the core; identical configs and identical inputs give
/// identical decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub enabled_modes: Vec<TradeMode>,
    pub conflict_policy: ConflictPolicy,
    pub entries: SignalCatalog,
    /// Exit-scoped condition sets (trend reversal).
    pub reversal_exits: SignalCatalog,
    pub roi: RoiTable,
    pub protection: ProfitProtection,
    /// Catastrophic-stop loss floor (0.30 = close at -30%).
    pub doom_floor: f64,
    pub dca: DcaTable,
    pub max_additions: usize,
    /// Stake for the opening entry of every position.
    pub initial_stake: f64,
    /// Hard cap on total stake per position.
    pub max_position_stake: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled_modes: TradeMode::ALL.to_vec(),
            conflict_policy: ConflictPolicy::RejectBoth,
            entries: default_entry_catalog(),
            reversal_exits: default_exit_catalog(),
            roi: RoiTable::default_table(),
            protection: ProfitProtection {
                activation: 0.05,
                retrace: 0.03,
            },
            doom_floor: 0.30,
            dca: DcaTable::default_table(),
            max_additions: 3,
            initial_stake: 50.0,
            max_position_stake: 500.0,
        }
    }
}

impl EngineConfig {
    /// Validate every table and threshold. Called once at engine
    /// construction; the only failure surface the operator ever sees.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled_modes.is_empty() {
            return Err(ConfigError::NoModesEnabled);
        }
        self.roi.validate()?;
        self.protection.validate()?;
        if !(self.doom_floor.is_finite() && self.doom_floor > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "doom_floor",
            });
        }
        self.dca_policy().validate()?;
        if !(self.initial_stake.is_finite() && self.initial_stake > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "initial_stake",
            });
        }
        for (catalog_name, catalog) in [
            ("entry", &self.entries),
            ("reversal_exit", &self.reversal_exits),
        ] {
            if let Some(&(mode, direction, id)) = catalog.duplicate_ids().first() {
                return Err(ConfigError::DuplicateConditionId {
                    catalog: catalog_name,
                    mode,
                    direction,
                    id,
                });
            }
        }
        Ok(())
    }

    /// The exit policy slice of this config.
    pub fn exit_policy(&self) -> ExitPolicy {
        ExitPolicy {
            roi: self.roi.clone(),
            protection: self.protection,
            doom_floor: self.doom_floor,
            reversal: self.reversal_exits.clone(),
        }
    }

    /// The DCA policy slice of this config.
    pub fn dca_policy(&self) -> DcaPolicy {
        DcaPolicy {
            table: self.dca.clone(),
            max_additions: self.max_additions,
            max_position_stake: self.max_position_stake,
        }
    }

    /// Blake3 over the canonical JSON serialization.
    ///
    /// Catalogs and tables are vectors, so the serialization is
    /// deterministic; two equal configs always hash identically.
    pub fn fingerprint(&self) -> ConfigHash {
        let json = serde_json::to_string(self).expect("EngineConfig must serialize");
        ConfigHash::from_bytes(json.as_bytes())
    }
}
