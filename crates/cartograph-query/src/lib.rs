//! Query-time orchestration for cartograph.
//!
//! [`QueryOrchestrator`] drives one request from search to response tier.
//! Attribution extraction, quality scoring, discovery pathways and the
//! deterministic reply texts live in their own modules so they can be used
//! and tested without a pipeline.

mod orchestrator;
mod reply;

pub mod error;
pub mod extract;
pub mod pathways;

pub use error::{Error, Result};
pub use extract::{AttributionExtractor, score};
pub use orchestrator::{
  DEFAULT_CONTEXT_LIMIT, ENHANCED_THRESHOLD, MIN_SEARCH_RESULTS, QueryOrchestrator,
};
pub use reply::{empty_text, fallback_text};
