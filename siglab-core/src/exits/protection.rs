//! Profit protection — lock gains once they retrace from the peak.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Profit-protection thresholds.
///
/// Arms once peak profit reaches `activation`; fires when current profit
/// has retraced `retrace` percentage points below that peak. Both are
/// profit fractions (0.05 = five points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitProtection {
    pub activation: f64,
    pub retrace: f64,
}

impl ProfitProtection {
    /// Whether the rule fires for the given peak and current profit.
    pub fn fires(&self, peak_profit: f64, current_profit: f64) -> bool {
        peak_profit >= self.activation && (peak_profit - current_profit) >= self.retrace
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.activation.is_finite() && self.activation > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "profit_protection.activation",
            });
        }
        if !(self.retrace.is_finite() && self.retrace > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "profit_protection.retrace",
            });
        }
        Ok(())
    }
}
