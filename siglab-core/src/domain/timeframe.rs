//! Timeframe — the closed set of supported bar resolutions.
//!
//! The primary timeframe drives the decision clock; the others are
//! informative timeframes whose indicator columns are merged into the
//! primary snapshot with a namespaced suffix.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Supported bar resolutions.
///
/// `M5` is the primary (decision) timeframe. Informative columns are
/// suffixed with the timeframe label so names never collide (e.g.
/// `RSI_3_1h` vs the primary `RSI_3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    /// All timeframes, fastest first.
    pub const ALL: [Timeframe; 5] = [
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    /// Bar period.
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::M5 => Duration::minutes(5),
            Timeframe::M15 => Duration::minutes(15),
            Timeframe::H1 => Duration::hours(1),
            Timeframe::H4 => Duration::hours(4),
            Timeframe::D1 => Duration::days(1),
        }
    }

    /// Canonical label (e.g. "1h").
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// Column suffix used when merging into the primary snapshot.
    ///
    /// The primary timeframe has no suffix.
    pub fn suffix(&self) -> &'static str {
        match self {
            Timeframe::M5 => "",
            Timeframe::M15 => "_15m",
            Timeframe::H1 => "_1h",
            Timeframe::H4 => "_4h",
            Timeframe::D1 => "_1d",
        }
    }

    pub fn parse(s: &str) -> Option<Timeframe> {
        Self::ALL.iter().copied().find(|tf| tf.as_str() == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_ascend() {
        for pair in Timeframe::ALL.windows(2) {
            assert!(pair[0].duration() < pair[1].duration());
        }
    }

    #[test]
    fn parse_roundtrip() {
        for tf in Timeframe::ALL {
            assert_eq!(Timeframe::parse(tf.as_str()), Some(tf));
        }
        assert_eq!(Timeframe::parse("3m"), None);
    }

    #[test]
    fn primary_has_no_suffix() {
        assert_eq!(Timeframe::M5.suffix(), "");
        assert_eq!(Timeframe::H1.suffix(), "_1h");
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&Timeframe::H4).unwrap();
        assert_eq!(json, "\"4h\"");
        let back: Timeframe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Timeframe::H4);
    }
}
