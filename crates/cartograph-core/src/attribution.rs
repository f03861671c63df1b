//! Presentation views over search hits: which source supports which claim.
//!
//! Two tiers exist. [`SourceAttribution`] is the basic shape used by the
//! `full` and `fallback` responses; [`EnhancedSourceAttribution`] adds quoted
//! evidence, position data and a formatted citation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::text::excerpt;

// ─── Basic tier ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttribution {
  pub source:            String,
  /// Primary entity of the hit.
  pub artist:            Option<String>,
  pub content_type:      String,
  pub confidence:        f64,
  /// Passage truncated to 200 characters.
  pub excerpt:           String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url:               Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub published_date:    Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub relationship_type: Option<String>,
}

// ─── Enhanced tier ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedSourceAttribution {
  pub source:             String,
  pub artist:             Option<String>,
  pub content_type:       String,
  pub confidence:         f64,
  /// Exact quoted span, or a 200-character passage excerpt.
  pub evidence_text:      String,
  /// "direct_quote", "contextual", ...
  pub evidence_type:      String,
  pub start_position:     Option<u32>,
  pub end_position:       Option<u32>,
  pub paragraph_number:   Option<u32>,
  pub url:                Option<String>,
  pub published_date:     Option<NaiveDate>,
  pub citation:           Option<String>,
  pub source_credibility: Option<f64>,
  pub relationship_type:  Option<String>,
}

impl EnhancedSourceAttribution {
  /// The citation, treating an empty string as absent.
  pub fn citation(&self) -> Option<&str> {
    self.citation.as_deref().filter(|c| !c.is_empty())
  }

  pub fn url(&self) -> Option<&str> {
    self.url.as_deref().filter(|u| !u.is_empty())
  }

  /// Whether the claim can be located inside its source document.
  pub fn has_position(&self) -> bool {
    self.paragraph_number.is_some()
      || (self.start_position.is_some() && self.end_position.is_some())
  }

  /// Human-readable location of the evidence.
  pub fn position_info(&self) -> String {
    match (self.paragraph_number, self.start_position, self.end_position) {
      (Some(paragraph), _, _) => format!("Paragraph {paragraph}"),
      (None, Some(start), Some(end)) => format!("Characters {start}-{end}"),
      _ => "Position unknown".to_owned(),
    }
  }

  /// Evidence cut to `max_length` characters, followed by its location.
  pub fn enhanced_excerpt(&self, max_length: usize) -> String {
    format!(
      "{} [{}]",
      excerpt(&self.evidence_text, max_length),
      self.position_info()
    )
  }
}

// ─── Quality ─────────────────────────────────────────────────────────────────

/// Aggregate evidence metrics over a set of enhanced attributions, each in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributionQuality {
  pub attribution_quality:       f64,
  pub citation_readiness:        f64,
  pub source_verification_score: f64,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn bare(evidence: &str) -> EnhancedSourceAttribution {
    EnhancedSourceAttribution {
      source:             "NPR".into(),
      artist:             None,
      content_type:       "article".into(),
      confidence:         0.5,
      evidence_text:      evidence.into(),
      evidence_type:      "contextual".into(),
      start_position:     None,
      end_position:       None,
      paragraph_number:   None,
      url:                None,
      published_date:     None,
      citation:           None,
      source_credibility: None,
      relationship_type:  None,
    }
  }

  #[test]
  fn position_info_prefers_paragraph() {
    let mut attr = bare("x");
    assert_eq!(attr.position_info(), "Position unknown");

    attr.start_position = Some(10);
    assert_eq!(attr.position_info(), "Position unknown");
    attr.end_position = Some(42);
    assert_eq!(attr.position_info(), "Characters 10-42");

    attr.paragraph_number = Some(3);
    assert_eq!(attr.position_info(), "Paragraph 3");
  }

  #[test]
  fn enhanced_excerpt_appends_position() {
    let mut attr = bare("Guthrie shaped everything Dylan wrote early on");
    attr.paragraph_number = Some(2);
    assert_eq!(attr.enhanced_excerpt(7), "Guthrie... [Paragraph 2]");
  }

  #[test]
  fn empty_citation_is_absent() {
    let mut attr = bare("x");
    attr.citation = Some(String::new());
    assert_eq!(attr.citation(), None);
  }
}
