//! Snapshot — one merged indicator row per primary-timeframe timestep.
//!
//! Values are keyed by column name. `f64::NAN` is the reserved "unknown"
//! sentinel, distinct from zero: a column that never existed and a column
//! whose informative bar has not closed yet both read back as unknown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of indicator values at a single primary-timeframe timestep.
///
/// Primary columns are unsuffixed (`RSI_3`, `close`); informative columns
/// carry the timeframe suffix (`RSI_3_1h`). Every informative value visible
/// here came from a bar that was fully closed by this timestamp — the
/// aggregator enforces that, not the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    values: HashMap<String, f64>,
}

impl Snapshot {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            values: HashMap::new(),
        }
    }

    pub fn with_values(timestamp: DateTime<Utc>, values: HashMap<String, f64>) -> Self {
        Self { timestamp, values }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Read a column. Returns `None` for a missing column *and* for the
    /// unknown sentinel — callers never observe NaN.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .get(name)
            .copied()
            .filter(|v| !v.is_nan())
    }

    /// Whether the column is present but holds the unknown sentinel.
    pub fn is_unknown(&self, name: &str) -> bool {
        self.values.get(name).map(|v| v.is_nan()).unwrap_or(false)
    }

    /// The current close price, the reference for profit and drawdown math.
    pub fn close(&self) -> Option<f64> {
        self.get("close")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn get_filters_unknown() {
        let mut snap = Snapshot::new(ts());
        snap.insert("RSI_3", 42.0);
        snap.insert("RSI_3_1h", f64::NAN);

        assert_eq!(snap.get("RSI_3"), Some(42.0));
        assert_eq!(snap.get("RSI_3_1h"), None);
        assert_eq!(snap.get("missing"), None);
    }

    #[test]
    fn unknown_is_distinct_from_zero() {
        let mut snap = Snapshot::new(ts());
        snap.insert("CMF_20", 0.0);
        snap.insert("CMF_20_1h", f64::NAN);

        assert_eq!(snap.get("CMF_20"), Some(0.0));
        assert!(!snap.is_unknown("CMF_20"));
        assert!(snap.is_unknown("CMF_20_1h"));
        assert!(!snap.is_unknown("missing"));
    }

    #[test]
    fn close_reads_close_column() {
        let mut snap = Snapshot::new(ts());
        assert_eq!(snap.close(), None);
        snap.insert("close", 101.5);
        assert_eq!(snap.close(), Some(101.5));
    }
}
