//! Predicates — data-driven conditions over one snapshot row.
//!
//! Condition sets are tables of records, not hard-coded branches: a
//! predicate is a small expression tree of comparisons over named columns,
//! serializable so rule catalogs can live in configuration.
//!
//! Unknown rule: any comparison touching an unknown value is false, never
//! an error. A missing informative series therefore silently disables the
//! rules that reference it instead of halting the evaluation.

use serde::{Deserialize, Serialize};

use crate::domain::Snapshot;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cmp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Cmp::Lt => lhs < rhs,
            Cmp::Le => lhs <= rhs,
            Cmp::Gt => lhs > rhs,
            Cmp::Ge => lhs >= rhs,
        }
    }
}

/// One side of a comparison: a named column or a constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Const(f64),
    Column(String),
}

impl Operand {
    fn resolve(&self, snapshot: &Snapshot) -> Option<f64> {
        match self {
            Operand::Const(v) => Some(*v),
            Operand::Column(name) => snapshot.get(name),
        }
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Const(v)
    }
}

impl From<&str> for Operand {
    fn from(name: &str) -> Self {
        Operand::Column(name.to_string())
    }
}

/// A predicate over one snapshot row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Single comparison. False when either operand is unknown.
    Cmp {
        lhs: Operand,
        op: Cmp,
        rhs: Operand,
    },
    /// Conjunction; true when every child is true (true when empty).
    All(Vec<Predicate>),
    /// Disjunction; true when any child is true (false when empty).
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Evaluate against one snapshot. Total: never errors, never panics.
    pub fn eval(&self, snapshot: &Snapshot) -> bool {
        match self {
            Predicate::Cmp { lhs, op, rhs } => match (lhs.resolve(snapshot), rhs.resolve(snapshot))
            {
                (Some(l), Some(r)) => op.apply(l, r),
                _ => false,
            },
            Predicate::All(children) => children.iter().all(|p| p.eval(snapshot)),
            Predicate::Any(children) => children.iter().any(|p| p.eval(snapshot)),
        }
    }

    pub fn cmp(lhs: impl Into<Operand>, op: Cmp, rhs: impl Into<Operand>) -> Self {
        Predicate::Cmp {
            lhs: lhs.into(),
            op,
            rhs: rhs.into(),
        }
    }

    pub fn gt(column: &str, value: f64) -> Self {
        Self::cmp(column, Cmp::Gt, value)
    }

    pub fn ge(column: &str, value: f64) -> Self {
        Self::cmp(column, Cmp::Ge, value)
    }

    pub fn lt(column: &str, value: f64) -> Self {
        Self::cmp(column, Cmp::Lt, value)
    }

    pub fn le(column: &str, value: f64) -> Self {
        Self::cmp(column, Cmp::Le, value)
    }

    pub fn all(children: Vec<Predicate>) -> Self {
        Predicate::All(children)
    }

    pub fn any(children: Vec<Predicate>) -> Self {
        Predicate::Any(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot(values: &[(&str, f64)]) -> Snapshot {
        let mut snap = Snapshot::new(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
        for (name, value) in values {
            snap.insert(*name, *value);
        }
        snap
    }

    #[test]
    fn comparison_against_constant() {
        let snap = snapshot(&[("RSI_3", 2.5)]);
        assert!(Predicate::lt("RSI_3", 3.0).eval(&snap));
        assert!(!Predicate::gt("RSI_3", 3.0).eval(&snap));
    }

    #[test]
    fn comparison_between_columns() {
        let snap = snapshot(&[("EMA_26", 105.0), ("EMA_12", 100.0)]);
        assert!(Predicate::cmp("EMA_26", Cmp::Gt, "EMA_12").eval(&snap));
        assert!(!Predicate::cmp("EMA_12", Cmp::Ge, "EMA_26").eval(&snap));
    }

    #[test]
    fn unknown_column_is_false_never_error() {
        let snap = snapshot(&[("RSI_3", 2.5)]);
        assert!(!Predicate::lt("RSI_3_1h", 50.0).eval(&snap));
        assert!(!Predicate::gt("RSI_3_1h", 50.0).eval(&snap));
    }

    #[test]
    fn nan_sentinel_is_false() {
        let snap = snapshot(&[("AROONU_14_4h", f64::NAN)]);
        assert!(!Predicate::lt("AROONU_14_4h", 100.0).eval(&snap));
    }

    #[test]
    fn any_recovers_from_unknown_branch() {
        // The original rule shape: (RSI_3 > 3) | (RSI_3_15m > 5) | (RSI_14_4h < 60)
        let snap = snapshot(&[("RSI_3", 10.0)]);
        let rule = Predicate::any(vec![
            Predicate::gt("RSI_3", 3.0),
            Predicate::gt("RSI_3_15m", 5.0),
            Predicate::lt("RSI_14_4h", 60.0),
        ]);
        assert!(rule.eval(&snap));
    }

    #[test]
    fn all_fails_when_any_branch_unknown() {
        let snap = snapshot(&[("RSI_3", 10.0)]);
        let rule = Predicate::all(vec![
            Predicate::gt("RSI_3", 3.0),
            Predicate::lt("RSI_14_4h", 60.0),
        ]);
        assert!(!rule.eval(&snap));
    }

    #[test]
    fn empty_combinators() {
        let snap = snapshot(&[]);
        assert!(Predicate::all(vec![]).eval(&snap));
        assert!(!Predicate::any(vec![]).eval(&snap));
    }

    #[test]
    fn serde_roundtrip_keeps_operand_shapes() {
        let rule = Predicate::all(vec![
            Predicate::cmp("EMA_26", Cmp::Gt, "EMA_12"),
            Predicate::lt("close", 0.999),
        ]);
        let json = serde_json::to_string(&rule).unwrap();
        let back: Predicate = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, back);
    }
}
