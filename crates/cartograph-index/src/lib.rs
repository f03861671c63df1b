//! In-memory relationship corpus for cartograph.
//!
//! The corpus is loaded from a knowledge-graph snapshot and held behind a
//! single shared pointer. Searches clone the pointer and scan it without
//! holding any lock; a reload builds the new corpus off to the side and swaps
//! the pointer in one step.

mod index;
mod snapshot;

pub mod error;

pub use error::{Error, Result};
pub use index::RelationshipIndex;
pub use snapshot::Snapshot;

#[cfg(test)]
mod tests;
