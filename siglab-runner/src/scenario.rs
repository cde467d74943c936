//! Serializable run configuration and per-instrument input series.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use siglab_core::config::EngineConfig;
use siglab_core::data::{merge_informative, AlignError, Series};
use siglab_core::domain::{Snapshot, Symbol};

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Serializable configuration for a universe run.
///
/// Captures everything needed to reproduce a run: the engine configuration
/// (catalogs, exit policy, DCA table) and the instrument universe. Data is
/// supplied separately as [`InstrumentSeries`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Instruments to evaluate.
    pub universe: Vec<Symbol>,

    /// Engine configuration shared by every instrument.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl RunConfig {
    /// Deterministic hash of this configuration.
    ///
    /// Two runs with identical configs share a RunId, so decision logs and
    /// summaries can be attributed to the exact parameterization.
    pub fn run_id(&self) -> Result<RunId> {
        let json =
            serde_json::to_string(self).context("failed to serialize run config for hashing")?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(text).context("failed to parse run config TOML")?;
        config
            .engine
            .validate()
            .context("run config failed engine validation")?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read run config {}", path.display()))?;
        Self::from_toml_str(&text)
    }
}

/// All input series for one instrument: the primary-timeframe indicator
/// rows plus zero or more informative-timeframe series.
#[derive(Debug, Clone)]
pub struct InstrumentSeries {
    pub symbol: Symbol,
    pub primary: Series,
    pub informatives: Vec<Series>,
}

impl InstrumentSeries {
    pub fn new(symbol: impl Into<Symbol>, primary: Series, informatives: Vec<Series>) -> Self {
        Self {
            symbol: symbol.into(),
            primary,
            informatives,
        }
    }

    /// Merge the informative series into the primary rows, one evaluation
    /// snapshot per primary timestep.
    pub fn merged(&self) -> Result<Vec<Snapshot>, AlignError> {
        merge_informative(&self.primary, &self.informatives)
    }
}
