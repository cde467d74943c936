//! Condition-set catalog and the mode signal evaluator.
//!
//! Each mode owns an ordered list of condition sets. Within one mode and
//! direction, sets are scanned in ascending id order and the first match
//! wins (more specific / aggressive rules carry lower ids). Across modes,
//! every mode may produce one candidate; a fixed mode-priority order plus
//! lowest-id tie-break arbitrates.

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, EntryDecision, Snapshot, TradeMode};

use super::predicate::Predicate;

/// A named, independently toggleable entry (or exit) rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    /// Stable identifier; doubles as the entry tag number.
    pub id: u32,
    pub mode: TradeMode,
    pub direction: Direction,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub predicate: Predicate,
}

fn default_enabled() -> bool {
    true
}

impl ConditionSet {
    pub fn new(id: u32, mode: TradeMode, direction: Direction, predicate: Predicate) -> Self {
        Self {
            id,
            mode,
            direction,
            enabled: true,
            predicate,
        }
    }
}

/// A matched condition set, before cross-mode arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCandidate {
    pub mode: TradeMode,
    pub direction: Direction,
    pub condition_id: u32,
}

/// What to do when both directions produce a surviving candidate in the
/// same timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// No simultaneous directions: drop both.
    #[default]
    RejectBoth,
    PreferLong,
    PreferShort,
}

/// An ordered catalog of condition sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalCatalog {
    sets: Vec<ConditionSet>,
}

impl SignalCatalog {
    /// Build a catalog. Sets are stored sorted by id so the per-mode scan
    /// order never depends on declaration order.
    pub fn new(mut sets: Vec<ConditionSet>) -> Self {
        sets.sort_by_key(|s| s.id);
        Self { sets }
    }

    pub fn empty() -> Self {
        Self { sets: Vec::new() }
    }

    pub fn sets(&self) -> &[ConditionSet] {
        &self.sets
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Ids that appear more than once within the same mode and direction.
    /// Non-empty means the catalog is invalid (caught at config load).
    pub fn duplicate_ids(&self) -> Vec<(TradeMode, Direction, u32)> {
        let mut dupes = Vec::new();
        for (i, set) in self.sets.iter().enumerate() {
            let seen_before = self.sets[..i]
                .iter()
                .any(|s| s.id == set.id && s.mode == set.mode && s.direction == set.direction);
            if seen_before {
                dupes.push((set.mode, set.direction, set.id));
            }
        }
        dupes
    }

    /// Evaluate the catalog against one snapshot.
    ///
    /// Returns at most one candidate per (mode, direction): the scan of a
    /// mode/direction stops at the first satisfied set (short-circuit).
    /// Disabled sets and disabled modes are skipped entirely. Pure: no
    /// state, identical inputs give identical candidates.
    pub fn evaluate(&self, snapshot: &Snapshot, enabled_modes: &[TradeMode]) -> Vec<EntryCandidate> {
        let mut candidates = Vec::new();
        for &mode in TradeMode::ALL.iter() {
            if !enabled_modes.contains(&mode) {
                continue;
            }
            for direction in [Direction::Long, Direction::Short] {
                if let Some(hit) = self.first_match(snapshot, mode, direction) {
                    candidates.push(hit);
                }
            }
        }
        candidates
    }

    /// Evaluate only one direction — used by the exit policy, where the
    /// scanned direction is the open position's own.
    pub fn evaluate_direction(
        &self,
        snapshot: &Snapshot,
        direction: Direction,
    ) -> Option<EntryCandidate> {
        for &mode in TradeMode::ALL.iter() {
            if let Some(hit) = self.first_match(snapshot, mode, direction) {
                return Some(hit);
            }
        }
        None
    }

    fn first_match(
        &self,
        snapshot: &Snapshot,
        mode: TradeMode,
        direction: Direction,
    ) -> Option<EntryCandidate> {
        self.sets
            .iter()
            .filter(|s| s.enabled && s.mode == mode && s.direction == direction)
            .find(|s| s.predicate.eval(snapshot))
            .map(|s| EntryCandidate {
                mode: s.mode,
                direction: s.direction,
                condition_id: s.id,
            })
    }
}

/// Cross-mode arbitration: exactly one decision (or none) per timestep.
///
/// Per direction, the winner is the candidate with the best (lowest) mode
/// priority; ties break on lowest condition id. If both directions still
/// hold a winner, `policy` decides.
pub fn resolve(candidates: &[EntryCandidate], policy: ConflictPolicy) -> Option<EntryDecision> {
    let best = |direction: Direction| -> Option<&EntryCandidate> {
        candidates
            .iter()
            .filter(|c| c.direction == direction)
            .min_by_key(|c| (c.mode.priority(), c.condition_id))
    };

    let long = best(Direction::Long);
    let short = best(Direction::Short);

    let winner = match (long, short) {
        (Some(l), None) => Some(l),
        (None, Some(s)) => Some(s),
        (Some(l), Some(s)) => match policy {
            ConflictPolicy::RejectBoth => None,
            ConflictPolicy::PreferLong => Some(l),
            ConflictPolicy::PreferShort => Some(s),
        },
        (None, None) => None,
    };

    winner.map(|c| EntryDecision::new(c.direction, c.mode, c.condition_id))
}
