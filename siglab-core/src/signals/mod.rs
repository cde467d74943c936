//! Mode signal evaluation — condition catalogs, predicates, arbitration.

pub mod builtin;
pub mod catalog;
pub mod predicate;

pub use builtin::{default_entry_catalog, default_exit_catalog};
pub use catalog::{resolve, ConditionSet, ConflictPolicy, EntryCandidate, SignalCatalog};
pub use predicate::{Cmp, Operand, Predicate};
