//! Informative-timeframe merge.
//!
//! Given the primary-timeframe indicator series and any number of slower
//! informative series, produce one merged snapshot per primary timestep.
//!
//! No-look-ahead contract: for a primary row at time T, an informative
//! column holds the value of the most recent informative bar whose close
//! time (bar start + period) is ≤ T. A bar closing exactly at T contains
//! only data strictly before T, so it is visible. Missing coverage yields
//! the unknown sentinel, never zero and never a forward-fill from nothing.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::domain::{Snapshot, Timeframe};

/// An indicator series on a single timeframe, rows sorted ascending.
///
/// Informative rows use raw (unsuffixed) column names; the merge applies
/// the timeframe suffix.
#[derive(Debug, Clone)]
pub struct Series {
    pub timeframe: Timeframe,
    pub rows: Vec<Snapshot>,
}

impl Series {
    pub fn new(timeframe: Timeframe, rows: Vec<Snapshot>) -> Self {
        Self { timeframe, rows }
    }

    fn validate_sorted(&self) -> Result<(), AlignError> {
        for (i, pair) in self.rows.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(AlignError::NotSorted {
                    timeframe: self.timeframe,
                    index: i + 1,
                });
            }
            if pair[1].timestamp == pair[0].timestamp {
                return Err(AlignError::DuplicateTimestamp {
                    timeframe: self.timeframe,
                    index: i + 1,
                });
            }
        }
        Ok(())
    }

    /// Union of column names across all rows, in deterministic order.
    fn column_names(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for row in &self.rows {
            for col in row.columns() {
                names.insert(col.to_string());
            }
        }
        names.into_iter().collect()
    }
}

/// Alignment failures. These are input-shape errors, caught before any
/// evaluation runs; the merge itself never fails on missing data.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("{timeframe:?} series is not sorted ascending at row {index}")]
    NotSorted { timeframe: Timeframe, index: usize },

    #[error("{timeframe:?} series has a duplicate timestamp at row {index}")]
    DuplicateTimestamp { timeframe: Timeframe, index: usize },

    #[error("informative timeframe {informative:?} is not slower than primary {primary:?}")]
    NotSlower {
        informative: Timeframe,
        primary: Timeframe,
    },
}

/// Merge informative series into the primary series.
///
/// Output has one snapshot per primary row. Informative columns are
/// namespaced with the timeframe suffix; rows before the first closed
/// informative bar hold the unknown sentinel.
pub fn merge_informative(
    primary: &Series,
    informative: &[Series],
) -> Result<Vec<Snapshot>, AlignError> {
    primary.validate_sorted()?;
    for series in informative {
        series.validate_sorted()?;
        if series.timeframe.duration() <= primary.timeframe.duration() {
            return Err(AlignError::NotSlower {
                informative: series.timeframe,
                primary: primary.timeframe,
            });
        }
    }

    // Per-series cursor state: column names, monotone row cursor, last
    // closed row index.
    let mut cursors: Vec<(Vec<String>, usize, Option<usize>)> = informative
        .iter()
        .map(|s| (s.column_names(), 0usize, None))
        .collect();

    let mut merged = Vec::with_capacity(primary.rows.len());

    for row in &primary.rows {
        let t = row.timestamp;
        let mut out = row.clone();

        for (series, (columns, cursor, last_closed)) in informative.iter().zip(cursors.iter_mut())
        {
            let period = series.timeframe.duration();
            while *cursor < series.rows.len() && series.rows[*cursor].timestamp + period <= t {
                *last_closed = Some(*cursor);
                *cursor += 1;
            }

            let suffix = series.timeframe.suffix();
            for col in columns.iter() {
                let value = last_closed
                    .and_then(|i| series.rows[i].get(col))
                    .unwrap_or(f64::NAN);
                out.insert(format!("{col}{suffix}"), value);
            }
        }

        merged.push(out);
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, hour, minute, 0).unwrap()
    }

    fn row(ts: DateTime<Utc>, name: &str, value: f64) -> Snapshot {
        let mut snap = Snapshot::new(ts);
        snap.insert(name, value);
        snap
    }

    fn primary_5m(values: &[(u32, u32, f64)]) -> Series {
        Series::new(
            Timeframe::M5,
            values
                .iter()
                .map(|&(h, m, v)| row(at(h, m), "close", v))
                .collect(),
        )
    }

    #[test]
    fn informative_visible_only_after_close() {
        let primary = primary_5m(&[(10, 55, 1.0), (11, 0, 2.0), (11, 5, 3.0)]);
        // 1h bar starting 10:00 closes at 11:00.
        let hourly = Series::new(Timeframe::H1, vec![row(at(10, 0), "RSI_3", 25.0)]);

        let merged = merge_informative(&primary, &[hourly]).unwrap();

        // 10:55 — bar not yet closed.
        assert_eq!(merged[0].get("RSI_3_1h"), None);
        assert!(merged[0].is_unknown("RSI_3_1h"));
        // 11:00 — bar closed exactly now, data all strictly before 11:00.
        assert_eq!(merged[1].get("RSI_3_1h"), Some(25.0));
        // 11:05 — still the same bar.
        assert_eq!(merged[2].get("RSI_3_1h"), Some(25.0));
    }

    #[test]
    fn later_bar_replaces_earlier_one() {
        let primary = primary_5m(&[(12, 0, 1.0), (13, 0, 2.0)]);
        let hourly = Series::new(
            Timeframe::H1,
            vec![row(at(11, 0), "RSI_3", 20.0), row(at(12, 0), "RSI_3", 30.0)],
        );

        let merged = merge_informative(&primary, &[hourly]).unwrap();
        assert_eq!(merged[0].get("RSI_3_1h"), Some(20.0));
        assert_eq!(merged[1].get("RSI_3_1h"), Some(30.0));
    }

    #[test]
    fn missing_coverage_yields_unknown_not_zero() {
        // Informative series starts long after the primary does.
        let primary = primary_5m(&[(9, 0, 1.0), (9, 5, 1.0)]);
        let hourly = Series::new(Timeframe::H1, vec![row(at(14, 0), "AROONU_14", 80.0)]);

        let merged = merge_informative(&primary, &[hourly]).unwrap();
        for snap in &merged {
            assert!(snap.is_unknown("AROONU_14_1h"));
            assert_eq!(snap.get("AROONU_14_1h"), None);
        }
    }

    #[test]
    fn absent_series_leaves_columns_missing() {
        let primary = primary_5m(&[(9, 0, 1.0)]);
        let merged = merge_informative(&primary, &[]).unwrap();
        assert_eq!(merged[0].get("RSI_3_4h"), None);
    }

    #[test]
    fn empty_informative_series_is_all_unknown() {
        let primary = primary_5m(&[(9, 0, 1.0)]);
        let hourly = Series::new(Timeframe::H1, vec![]);
        let merged = merge_informative(&primary, &[hourly]).unwrap();
        // No rows means no known column names, so nothing to read.
        assert_eq!(merged[0].get("RSI_3_1h"), None);
    }

    #[test]
    fn primary_columns_are_unsuffixed_and_untouched() {
        let primary = primary_5m(&[(12, 0, 42.5)]);
        let hourly = Series::new(Timeframe::H1, vec![row(at(10, 0), "close", 41.0)]);

        let merged = merge_informative(&primary, &[hourly]).unwrap();
        assert_eq!(merged[0].get("close"), Some(42.5));
        assert_eq!(merged[0].get("close_1h"), Some(41.0));
    }

    #[test]
    fn unsorted_primary_rejected() {
        let primary = primary_5m(&[(12, 5, 1.0), (12, 0, 2.0)]);
        let err = merge_informative(&primary, &[]).unwrap_err();
        assert!(matches!(err, AlignError::NotSorted { .. }));
    }

    #[test]
    fn duplicate_timestamps_rejected() {
        let primary = primary_5m(&[(12, 0, 1.0), (12, 0, 2.0)]);
        let err = merge_informative(&primary, &[]).unwrap_err();
        assert!(matches!(err, AlignError::DuplicateTimestamp { .. }));
    }

    #[test]
    fn informative_must_be_slower() {
        let primary = primary_5m(&[(12, 0, 1.0)]);
        let same = Series::new(Timeframe::M5, vec![row(at(11, 55), "RSI_3", 10.0)]);
        let err = merge_informative(&primary, &[same]).unwrap_err();
        assert!(matches!(err, AlignError::NotSlower { .. }));
    }
}
