//! Reporting and export — run summaries, CSV decision logs, JSON artifacts.
//!
//! Two export surfaces:
//! - **CSV**: the decision log (audit trail, one row per committed decision)
//!   and the trade tape, for external analysis tools.
//! - **JSON**: the full `InstrumentResult` plus a compact `RunSummary`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::paper::{DecisionEvent, TradeRecord};
use crate::runner::InstrumentResult;

/// Compact per-instrument summary of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub symbol: String,
    pub trade_count: usize,
    pub win_count: usize,
    /// Wins over closed trades; 0 when no trade closed.
    pub win_rate: f64,
    /// Sum of per-trade profit fractions.
    pub total_profit: f64,
    pub additions_total: usize,
    /// Closed trades per exit tag.
    pub exit_reasons: BTreeMap<String, usize>,
    pub left_open: bool,
}

impl RunSummary {
    pub fn from_result(result: &InstrumentResult) -> Self {
        let trade_count = result.trades.len();
        let win_count = result.trades.iter().filter(|t| t.profit > 0.0).count();
        let mut exit_reasons = BTreeMap::new();
        for trade in &result.trades {
            *exit_reasons.entry(trade.exit_reason.tag().to_string()).or_insert(0) += 1;
        }
        Self {
            symbol: result.symbol.clone(),
            trade_count,
            win_count,
            win_rate: if trade_count > 0 {
                win_count as f64 / trade_count as f64
            } else {
                0.0
            },
            total_profit: result.trades.iter().map(|t| t.profit).sum(),
            additions_total: result.trades.iter().map(|t| t.additions).sum(),
            exit_reasons,
            left_open: result.left_open,
        }
    }
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the decision log as CSV.
///
/// Columns: symbol, timestamp, kind, tag, price
pub fn export_decision_log_csv(events: &[DecisionEvent]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["symbol", "timestamp", "kind", "tag", "price"])?;
    for event in events {
        wtr.write_record([
            event.symbol.as_str(),
            &event.timestamp.to_rfc3339(),
            event.kind.as_str(),
            &event.tag,
            &event
                .price
                .map(|p| format!("{p:.8}"))
                .unwrap_or_default(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the trade tape as CSV.
///
/// Columns: symbol, direction, opened_at, closed_at, entry_price,
/// exit_price, stake, additions, profit, entry_tag, exit_tag
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "direction",
        "opened_at",
        "closed_at",
        "entry_price",
        "exit_price",
        "stake",
        "additions",
        "profit",
        "entry_tag",
        "exit_tag",
    ])?;
    for t in trades {
        wtr.write_record([
            t.symbol.as_str(),
            &format!("{:?}", t.direction),
            &t.opened_at.to_rfc3339(),
            &t.closed_at.to_rfc3339(),
            &format!("{:.8}", t.entry_price),
            &format!("{:.8}", t.exit_price),
            &format!("{:.2}", t.stake),
            &t.additions.to_string(),
            &format!("{:.6}", t.profit),
            &t.entry_tag,
            &t.exit_tag,
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for one instrument's run.
///
/// Creates `{output_dir}/{symbol with / replaced}/` containing:
/// - `result.json` — the full `InstrumentResult`
/// - `summary.json` — the compact `RunSummary`
/// - `trades.csv` — trade tape
/// - `decisions.csv` — the decision log
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &InstrumentResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = result.symbol.replace('/', "_");
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir {}", run_dir.display()))?;

    let json = serde_json::to_string_pretty(result)
        .context("failed to serialize instrument result")?;
    std::fs::write(run_dir.join("result.json"), json)?;

    let summary = serde_json::to_string_pretty(&RunSummary::from_result(result))
        .context("failed to serialize run summary")?;
    std::fs::write(run_dir.join("summary.json"), summary)?;

    std::fs::write(run_dir.join("trades.csv"), export_trades_csv(&result.trades)?)?;
    std::fs::write(
        run_dir.join("decisions.csv"),
        export_decision_log_csv(&result.decision_log)?,
    )?;

    Ok(run_dir)
}

/// Load an `InstrumentResult` back from an artifact directory.
pub fn load_artifacts(dir: &Path) -> Result<InstrumentResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).context("failed to deserialize instrument result")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use siglab_core::domain::{Direction, ExitReason};

    use crate::paper::DecisionKind;

    fn sample_trade(profit: f64, reason: ExitReason) -> TradeRecord {
        TradeRecord {
            symbol: "BTC/USDT".into(),
            direction: Direction::Long,
            opened_at: Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
            closed_at: Utc.with_ymd_and_hms(2024, 3, 15, 11, 0, 0).unwrap(),
            entry_price: 100.0,
            exit_price: 100.0 * (1.0 + profit),
            stake: 50.0,
            additions: 0,
            profit,
            entry_tag: "scalp_41".into(),
            exit_tag: reason.tag().into(),
            exit_reason: reason,
        }
    }

    fn sample_result() -> InstrumentResult {
        InstrumentResult {
            symbol: "BTC/USDT".into(),
            trades: vec![
                sample_trade(0.02, ExitReason::RoiTarget),
                sample_trade(-0.31, ExitReason::CatastrophicStop),
                sample_trade(0.045, ExitReason::ProfitProtection),
            ],
            decision_log: vec![DecisionEvent {
                symbol: "BTC/USDT".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
                kind: DecisionKind::Entry,
                tag: "scalp_41".into(),
                price: Some(100.0),
            }],
            snapshots_processed: 100,
            left_open: false,
        }
    }

    #[test]
    fn summary_aggregates_trades() {
        let summary = RunSummary::from_result(&sample_result());
        assert_eq!(summary.trade_count, 3);
        assert_eq!(summary.win_count, 2);
        assert!((summary.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.total_profit - (0.02 - 0.31 + 0.045)).abs() < 1e-12);
        assert_eq!(summary.exit_reasons["roi_target"], 1);
        assert_eq!(summary.exit_reasons["doom_stop"], 1);
        assert_eq!(summary.exit_reasons["profit_protection"], 1);
    }

    #[test]
    fn summary_of_empty_run_has_zero_win_rate() {
        let mut result = sample_result();
        result.trades.clear();
        let summary = RunSummary::from_result(&result);
        assert_eq!(summary.trade_count, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert!(summary.exit_reasons.is_empty());
    }

    #[test]
    fn decision_log_csv_has_header_and_rows() {
        let result = sample_result();
        let csv = export_decision_log_csv(&result.decision_log).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "symbol,timestamp,kind,tag,price");
        assert!(lines[1].contains("scalp_41"));
        assert!(lines[1].contains("entry"));
    }

    #[test]
    fn trades_csv_carries_tags() {
        let csv = export_trades_csv(&sample_result().trades).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("roi_target"));
        assert!(lines[2].contains("doom_stop"));
        assert!(lines[3].contains("profit_protection"));
    }

    #[test]
    fn empty_trades_csv_is_header_only() {
        let csv = export_trades_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn save_load_artifacts_roundtrip() {
        let result = sample_result();
        let dir = tempfile::tempdir().unwrap();
        let run_dir = save_artifacts(&result, dir.path()).unwrap();

        assert!(run_dir.join("result.json").exists());
        assert!(run_dir.join("summary.json").exists());
        assert!(run_dir.join("trades.csv").exists());
        assert!(run_dir.join("decisions.csv").exists());

        let loaded = load_artifacts(&run_dir).unwrap();
        assert_eq!(loaded.symbol, result.symbol);
        assert_eq!(loaded.trades.len(), result.trades.len());
        assert_eq!(loaded.snapshots_processed, result.snapshots_processed);
    }
}
