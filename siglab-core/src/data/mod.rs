//! Snapshot aggregation — merging informative timeframes into the primary.

pub mod align;

pub use align::{merge_informative, AlignError, Series};
