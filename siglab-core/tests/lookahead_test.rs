//! Look-ahead contamination tests for the informative-timeframe merge.
//!
//! Invariant: no informative value visible at primary time T may come from
//! a bar that was still open at T.
//!
//! Method: merge against truncated informative series (first half) and the
//! full series. Every primary row whose informative values were available
//! in the truncated run must be identical in the full run — any difference
//! means future informative bars leaked into past rows.

use chrono::{DateTime, Duration, TimeZone, Utc};
use siglab_core::data::{merge_informative, Series};
use siglab_core::domain::{Snapshot, Timeframe};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

/// Deterministic pseudo-random value stream (simple LCG, no rand dep).
fn noise(i: u64) -> f64 {
    let seed = i.wrapping_mul(6364136223846793005).wrapping_add(1);
    ((seed % 1000) as f64 - 500.0) * 0.01
}

fn make_series(timeframe: Timeframe, bars: usize, columns: &[&str]) -> Series {
    let period = timeframe.duration();
    let rows = (0..bars)
        .map(|i| {
            let mut snap = Snapshot::new(start() + period * i as i32);
            for (c, col) in columns.iter().enumerate() {
                snap.insert(*col, 50.0 + noise(i as u64 * 7 + c as u64));
            }
            snap
        })
        .collect();
    Series::new(timeframe, rows)
}

fn assert_merge_prefix_stable(informative_tf: Timeframe, columns: &[&str]) {
    let primary = make_series(Timeframe::M5, 600, &["close", "RSI_3"]);
    let informative_bars = (600 * 5) / informative_tf.duration().num_minutes() as usize;
    let full = make_series(informative_tf, informative_bars.max(8), columns);
    let truncated = Series::new(
        informative_tf,
        full.rows[..full.rows.len() / 2].to_vec(),
    );

    let merged_full = merge_informative(&primary, &[full.clone()]).unwrap();
    let merged_trunc = merge_informative(&primary, &[truncated.clone()]).unwrap();

    // The last truncated bar closes here; before that point both runs saw
    // exactly the same set of closed bars.
    let horizon = truncated.rows.last().unwrap().timestamp + informative_tf.duration();

    for (row_full, row_trunc) in merged_full.iter().zip(merged_trunc.iter()) {
        if row_full.timestamp > horizon {
            break;
        }
        for col in columns {
            let name = format!("{col}{}", informative_tf.suffix());
            let f = row_full.get(&name);
            let t = row_trunc.get(&name);
            assert_eq!(
                f, t,
                "look-ahead contamination in {name} at {}: full={f:?}, truncated={t:?}",
                row_full.timestamp
            );
        }
    }
}

#[test]
fn lookahead_15m() {
    assert_merge_prefix_stable(Timeframe::M15, &["RSI_3", "AROONU_14"]);
}

#[test]
fn lookahead_1h() {
    assert_merge_prefix_stable(Timeframe::H1, &["RSI_3", "CMF_20"]);
}

#[test]
fn lookahead_4h() {
    assert_merge_prefix_stable(Timeframe::H4, &["RSI_14", "STOCHRSIk_14_14_3_3"]);
}

#[test]
fn merged_value_always_from_a_closed_bar() {
    // Direct check of the visibility rule: walk every merged row and verify
    // the informative value matches the latest bar with close time ≤ T.
    let primary = make_series(Timeframe::M5, 300, &["close"]);
    let hourly = make_series(Timeframe::H1, 20, &["RSI_3"]);

    let merged = merge_informative(&primary, &[hourly.clone()]).unwrap();

    for row in &merged {
        let expected = hourly
            .rows
            .iter()
            .rev()
            .find(|bar| bar.timestamp + Duration::hours(1) <= row.timestamp)
            .and_then(|bar| bar.get("RSI_3"));
        assert_eq!(
            row.get("RSI_3_1h"),
            expected,
            "wrong bar selected at {}",
            row.timestamp
        );
    }
}

#[test]
fn full_stack_merge_of_all_informative_timeframes() {
    let primary = make_series(Timeframe::M5, 1000, &["close", "RSI_3", "RSI_14"]);
    let informative = vec![
        make_series(Timeframe::M15, 340, &["RSI_3"]),
        make_series(Timeframe::H1, 90, &["RSI_3", "CMF_20"]),
        make_series(Timeframe::H4, 24, &["RSI_14"]),
        make_series(Timeframe::D1, 5, &["RSI_3"]),
    ];

    let merged = merge_informative(&primary, &informative).unwrap();
    assert_eq!(merged.len(), 1000);

    // Early rows see nothing from the daily timeframe; late rows see it.
    assert!(merged[0].get("RSI_3_1d").is_none());
    let last = merged.last().unwrap();
    assert!(last.get("RSI_3_1d").is_some());
    assert!(last.get("RSI_3_1h").is_some());
    assert!(last.get("RSI_14_4h").is_some());
    // Primary columns survive unsuffixed.
    assert!(last.get("RSI_14").is_some());
}
