//! Relationship types, the atomic unit of the knowledge graph.
//!
//! A relationship is a typed, evidenced, sourced connection between two named
//! entities. Relationships arrive in bulk from a knowledge-graph snapshot and
//! are never mutated afterwards; a reload replaces the whole corpus.
//!
//! Every field is optional on the wire. Missing or `null` fields default to
//! empty values so that partially-enriched records still load and still
//! project to text.

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

// ─── Provenance ──────────────────────────────────────────────────────────────

/// Where a relationship was documented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceRef {
  /// Publisher name, e.g. "Pitchfork" or "NPR".
  #[serde(deserialize_with = "null_default")]
  pub source:           String,
  pub url:              Option<String>,
  pub author:           Option<String>,
  pub title:            Option<String>,
  #[serde(deserialize_with = "lenient_date")]
  pub published_date:   Option<NaiveDate>,
  /// Kind of publication ("article", "review", "interview", ...).
  pub publication_type: Option<String>,
}

impl SourceRef {
  /// The URL, treating an empty string as absent.
  pub fn url(&self) -> Option<&str> {
    self.url.as_deref().filter(|u| !u.trim().is_empty())
  }

  pub fn author(&self) -> Option<&str> {
    self.author.as_deref().filter(|a| !a.trim().is_empty())
  }

  pub fn title(&self) -> Option<&str> {
    self.title.as_deref().filter(|t| !t.trim().is_empty())
  }
}

/// Reads `null` as the field's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de> + Default,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp, or anything else (→ `None`).
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = serde_json::Value::deserialize(deserializer)?;
  Ok(raw.as_str().and_then(|s| {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .ok()
      .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
  }))
}

// ─── Enrichment ──────────────────────────────────────────────────────────────

/// When a relationship happened. Upstream enrichment jobs emit either free
/// text or a structured era.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemporalContext {
  Text(String),
  Era(EraContext),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EraContext {
  pub era_name:   Option<String>,
  pub start_year: Option<i32>,
  pub end_year:   Option<i32>,
}

impl fmt::Display for TemporalContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Text(text) => f.write_str(text),
      Self::Era(era) => match (&era.era_name, era.start_year, era.end_year) {
        (Some(name), _, _) => f.write_str(name),
        (None, Some(start), Some(end)) => write!(f, "{start}-{end}"),
        (None, Some(year), None) | (None, None, Some(year)) => write!(f, "{year}"),
        (None, None, None) => Ok(()),
      },
    }
  }
}

/// Cultural significance: a score from the enrichment pipeline or a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Significance {
  Score(f64),
  Label(String),
}

impl fmt::Display for Significance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Score(score) => write!(f, "{score}"),
      Self::Label(label) => f.write_str(label),
    }
  }
}

/// A fine-grained claim about one entity, produced by the citation-enhancement
/// job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityAttribution {
  pub entity:     Option<String>,
  /// Exact quoted span supporting the claim.
  pub evidence:   Option<String>,
  pub confidence: Option<f64>,
  /// Pre-formatted citation string.
  pub citation:   Option<String>,
}

/// Typed view over the enrichment fields carried under `metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipMetadata {
  pub cultural_context:         Option<String>,
  pub cultural_significance:    Option<Significance>,
  pub evidence_type:            Option<String>,
  #[serde(deserialize_with = "null_default")]
  pub entity_attributions:      Vec<EntityAttribution>,
  pub chunk_start_position:     Option<u32>,
  pub chunk_end_position:       Option<u32>,
  #[serde(deserialize_with = "null_default")]
  pub paragraph_numbers:        Vec<u32>,
  /// 0..1 completeness score assigned by the enhancement job.
  pub attribution_completeness: Option<f64>,
}

// ─── Relationship ────────────────────────────────────────────────────────────

/// A typed, evidenced, sourced connection between two named entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relationship {
  #[serde(deserialize_with = "null_default")]
  pub source_entity:      String,
  #[serde(deserialize_with = "null_default")]
  pub target_entity:      String,
  /// Open tag, e.g. "influence", "collaboration", "canonical_reference".
  #[serde(deserialize_with = "null_default")]
  pub relationship_type:  String,
  #[serde(deserialize_with = "null_default")]
  pub evidence:           String,
  /// Trust score in `[0, 1]`.
  #[serde(deserialize_with = "null_default")]
  pub confidence:         f64,
  #[serde(deserialize_with = "null_default")]
  pub source_attribution: SourceRef,
  pub temporal_context:   Option<TemporalContext>,
  #[serde(deserialize_with = "null_default")]
  pub metadata:           RelationshipMetadata,
}

impl Relationship {
  /// The non-empty entity names, source first.
  pub fn entities(&self) -> Vec<&str> {
    [self.source_entity.as_str(), self.target_entity.as_str()]
      .into_iter()
      .filter(|e| !e.trim().is_empty())
      .collect()
  }

  /// Publisher name, or `None` for unsourced records.
  pub fn source_name(&self) -> Option<&str> {
    let source = self.source_attribution.source.as_str();
    (!source.trim().is_empty()).then_some(source)
  }

  pub fn temporal_text(&self) -> Option<String> {
    self
      .temporal_context
      .as_ref()
      .map(ToString::to_string)
      .filter(|t| !t.trim().is_empty())
  }

  /// Human-readable passage shown to readers and fed to the synthesizer:
  /// `"A influence B. <evidence> Context: <temporal>"`.
  pub fn passage(&self) -> String {
    let mut parts = Vec::with_capacity(3);
    if !self.source_entity.is_empty()
      && !self.target_entity.is_empty()
      && !self.relationship_type.is_empty()
    {
      parts.push(format!(
        "{} {} {}.",
        self.source_entity, self.relationship_type, self.target_entity
      ));
    }
    if !self.evidence.is_empty() {
      parts.push(self.evidence.clone());
    }
    if let Some(temporal) = self.temporal_text() {
      parts.push(format!("Context: {temporal}"));
    }
    parts.join(" ")
  }

  /// Title used for citations when the source carries none.
  pub fn display_title(&self) -> Option<String> {
    if let Some(title) = self.source_attribution.title() {
      return Some(title.to_owned());
    }
    (!self.source_entity.is_empty() && !self.target_entity.is_empty())
      .then(|| format!("{} - {} Relationship", self.source_entity, self.target_entity))
  }
}
