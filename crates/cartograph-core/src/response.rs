//! Query responses.
//!
//! A response is exactly one of four tiers. The tier is a closed enum carried
//! on the wire as the `mode` field, and each tier owns the source shape that
//! belongs to it.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::attribution::{
  AttributionQuality, EnhancedSourceAttribution, SourceAttribution,
};

/// Provenance of a response, weakest last.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
  Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseMode {
  /// Synthesized narrative with basic attributions.
  Full,
  /// Synthesized narrative with citation-grade attributions.
  Enhanced,
  /// Direct search results; no synthesis.
  Fallback,
  /// Nothing matched, or search could not run.
  Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResponseTier {
  Full {
    sources: Vec<SourceAttribution>,
  },
  Enhanced {
    sources: Vec<EnhancedSourceAttribution>,
    #[serde(flatten)]
    quality: AttributionQuality,
  },
  Fallback {
    sources: Vec<SourceAttribution>,
  },
  Empty {
    sources: Vec<SourceAttribution>,
  },
}

impl ResponseTier {
  pub fn empty() -> Self { Self::Empty { sources: Vec::new() } }

  pub fn mode(&self) -> ResponseMode {
    match self {
      Self::Full { .. } => ResponseMode::Full,
      Self::Enhanced { .. } => ResponseMode::Enhanced,
      Self::Fallback { .. } => ResponseMode::Fallback,
      Self::Empty { .. } => ResponseMode::Empty,
    }
  }

  pub fn source_count(&self) -> usize {
    match self {
      Self::Enhanced { sources, .. } => sources.len(),
      Self::Full { sources }
      | Self::Fallback { sources }
      | Self::Empty { sources } => sources.len(),
    }
  }

  /// Publisher names of the attached sources, in order.
  pub fn source_names(&self) -> Vec<&str> {
    match self {
      Self::Enhanced { sources, .. } => {
        sources.iter().map(|s| s.source.as_str()).collect()
      }
      Self::Full { sources }
      | Self::Fallback { sources }
      | Self::Empty { sources } => {
        sources.iter().map(|s| s.source.as_str()).collect()
      }
    }
  }
}

/// Processing statistics attached to every response. Which fields are set
/// depends on the tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStats {
  pub search_results_count:     usize,
  pub sources_count:            usize,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_relationships:      Option<usize>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub average_confidence:       Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub attribution_completeness: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub citation_ready_sources:   Option<usize>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verified_sources:         Option<usize>,
  /// Why the pipeline degraded, for fallback responses.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason:                   Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
  pub response:           String,
  /// Wall-clock time for the whole request; stamped by the HTTP layer.
  pub query_time_ms:      u64,
  pub discovery_pathways: Option<Vec<String>>,
  pub stats:              QueryStats,
  #[serde(flatten)]
  pub tier:               ResponseTier,
}

impl QueryResponse {
  pub fn mode(&self) -> ResponseMode { self.tier.mode() }
}
