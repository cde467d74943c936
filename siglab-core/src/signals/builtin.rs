//! Built-in rule catalogs.
//!
//! The default parameterization of the engine: multi-timeframe RSI dip
//! grids for trend entries, AROON/ROC spike rules for rapid entries,
//! STOCHRSI scalp rules, large-cap and rebuy variants, and the reversal
//! exit rules. Ids are stable and namespaced per mode family so audit tags
//! stay meaningful across catalog revisions.

use crate::domain::{Direction, TradeMode};

use super::catalog::{ConditionSet, SignalCatalog};
use super::predicate::{Cmp, Predicate};

/// Default entry catalog.
pub fn default_entry_catalog() -> SignalCatalog {
    let mut sets = Vec::new();

    // ── Trend (normal) long entries ──────────────────────────────────
    // #1: the deep multi-timeframe RSI dip grid, gated by an EMA spread
    // and a Bollinger lower-band poke-through.
    sets.push(ConditionSet::new(
        1,
        TradeMode::Trend,
        Direction::Long,
        Predicate::all(vec![
            Predicate::any(vec![
                Predicate::gt("RSI_3", 3.0),
                Predicate::gt("RSI_3_15m", 3.0),
                Predicate::gt("RSI_3_change_pct_1h", -50.0),
            ]),
            Predicate::any(vec![
                Predicate::gt("RSI_3", 3.0),
                Predicate::gt("RSI_3_15m", 5.0),
                Predicate::lt("RSI_14_4h", 60.0),
            ]),
            Predicate::any(vec![
                Predicate::gt("RSI_3", 3.0),
                Predicate::gt("RSI_3_15m", 10.0),
                Predicate::lt("AROONU_14_4h", 100.0),
            ]),
            Predicate::any(vec![
                Predicate::gt("RSI_3", 3.0),
                Predicate::gt("RSI_3_1h", 15.0),
                Predicate::lt("AROONU_14_15m", 30.0),
            ]),
            Predicate::any(vec![
                Predicate::gt("RSI_3_15m", 1.0),
                Predicate::gt("CMF_20_1h", -0.1),
                Predicate::lt("AROONU_14_1h", 70.0),
            ]),
            Predicate::any(vec![
                Predicate::gt("RSI_3_15m", 3.0),
                Predicate::gt("RSI_3_1h", 35.0),
                Predicate::lt("STOCHRSIk_14_14_3_3_4h", 50.0),
            ]),
            Predicate::any(vec![
                Predicate::gt("RSI_3_15m", 3.0),
                Predicate::gt("RSI_3_1h", 10.0),
                Predicate::gt("RSI_3_4h", 15.0),
                Predicate::gt("RSI_3_1d", 15.0),
            ]),
            Predicate::any(vec![
                Predicate::gt("RSI_3_15m", 5.0),
                Predicate::gt("RSI_3_1h", 5.0),
                Predicate::lt("ROC_9_1d", 40.0),
            ]),
            Predicate::cmp("EMA_26", Cmp::Gt, "EMA_12"),
            Predicate::cmp("EMA_spread", Cmp::Gt, "EMA_spread_floor"),
            Predicate::cmp("close", Cmp::Lt, "BBL_20_2.0"),
        ]),
    ));

    // #2: shallower dip, requires a calm higher timeframe.
    sets.push(ConditionSet::new(
        2,
        TradeMode::Trend,
        Direction::Long,
        Predicate::all(vec![
            Predicate::lt("RSI_14", 30.0),
            Predicate::gt("RSI_3", 5.0),
            Predicate::lt("RSI_14_1h", 50.0),
            Predicate::lt("AROONU_14_4h", 80.0),
            Predicate::cmp("close", Cmp::Lt, "EMA_20"),
        ]),
    ));

    // #6: trend short — the mirrored overbought grid.
    sets.push(ConditionSet::new(
        6,
        TradeMode::Trend,
        Direction::Short,
        Predicate::all(vec![
            Predicate::gt("RSI_14", 70.0),
            Predicate::lt("RSI_3", 97.0),
            Predicate::gt("RSI_14_1h", 60.0),
            Predicate::gt("AROOND_14_4h", 80.0),
            Predicate::cmp("close", Cmp::Gt, "BBU_20_2.0"),
        ]),
    ));

    // ── Rapid (momentum spike) ────────────────────────────────────────
    sets.push(ConditionSet::new(
        101,
        TradeMode::Rapid,
        Direction::Long,
        Predicate::all(vec![
            Predicate::gt("ROC_9_1h", 5.0),
            Predicate::gt("AROONU_14_15m", 70.0),
            Predicate::lt("RSI_14", 60.0),
            Predicate::gt("CMF_20", 0.0),
        ]),
    ));
    sets.push(ConditionSet::new(
        102,
        TradeMode::Rapid,
        Direction::Long,
        Predicate::all(vec![
            Predicate::gt("ROC_9", 2.0),
            Predicate::gt("volume_mean_factor", 2.0),
            Predicate::lt("RSI_14_1h", 65.0),
        ]),
    ));

    // ── Scalp (mean reversion) ────────────────────────────────────────
    sets.push(ConditionSet::new(
        41,
        TradeMode::Scalp,
        Direction::Long,
        Predicate::all(vec![
            Predicate::lt("STOCHRSIk_14_14_3_3", 10.0),
            Predicate::lt("RSI_3", 10.0),
            Predicate::gt("RSI_3_1h", 20.0),
            Predicate::cmp("close", Cmp::Lt, "BBL_20_2.0"),
        ]),
    ));
    sets.push(ConditionSet::new(
        42,
        TradeMode::Scalp,
        Direction::Short,
        Predicate::all(vec![
            Predicate::gt("STOCHRSIk_14_14_3_3", 90.0),
            Predicate::gt("RSI_3", 90.0),
            Predicate::lt("RSI_3_1h", 80.0),
            Predicate::cmp("close", Cmp::Gt, "BBU_20_2.0"),
        ]),
    ));

    // ── Large cap ─────────────────────────────────────────────────────
    sets.push(ConditionSet::new(
        61,
        TradeMode::LargeCap,
        Direction::Long,
        Predicate::all(vec![
            Predicate::lt("RSI_14", 35.0),
            Predicate::gt("RSI_3_15m", 10.0),
            Predicate::lt("RSI_14_1d", 55.0),
            Predicate::gt("CMF_20_4h", -0.2),
        ]),
    ));

    // ── Rebuy (grind-friendly entries) ───────────────────────────────
    sets.push(ConditionSet::new(
        81,
        TradeMode::Rebuy,
        Direction::Long,
        Predicate::all(vec![
            Predicate::lt("RSI_14", 40.0),
            Predicate::gt("RSI_3", 5.0),
            Predicate::lt("AROONU_14_1h", 85.0),
            Predicate::lt("STOCHRSIk_14_14_3_3_1h", 40.0),
        ]),
    ));

    SignalCatalog::new(sets)
}

/// Default exit-scoped catalog (trend reversal rules).
///
/// Structurally identical to entry sets; the scanned direction is the open
/// position's own. Fires at any profit level — it is a risk override, not a
/// target-reached signal.
pub fn default_exit_catalog() -> SignalCatalog {
    SignalCatalog::new(vec![
        ConditionSet::new(
            1,
            TradeMode::Trend,
            Direction::Long,
            Predicate::any(vec![
                Predicate::gt("RSI_14", 70.0),
                Predicate::gt("RSI_14_1h", 75.0),
                Predicate::cmp("close", Cmp::Lt, "BBL_20_2.0"),
                Predicate::lt("CMF_20", -0.2),
            ]),
        ),
        ConditionSet::new(
            2,
            TradeMode::Trend,
            Direction::Short,
            Predicate::any(vec![
                Predicate::lt("RSI_14", 30.0),
                Predicate::lt("RSI_14_1h", 25.0),
                Predicate::cmp("close", Cmp::Gt, "BBU_20_2.0"),
                Predicate::gt("CMF_20", 0.2),
            ]),
        ),
    ])
}
