//! Search hits → source attributions, and attribution quality scoring.

use cartograph_citation::{CitationSource, CitationStyle, render};
use cartograph_core::{
  attribution::{AttributionQuality, EnhancedSourceAttribution, SourceAttribution},
  relationship::EntityAttribution,
  retrieve::SearchHit,
  text::excerpt,
};

const EXCERPT_CHARS: usize = 200;
const CITATION_EXCERPT_CHARS: usize = 50;
const UNKNOWN_SOURCE: &str = "Unknown Source";

/// Builds both attribution tiers from ranked hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributionExtractor {
  /// Style for citations derived from raw hits; `None` keeps the plain form.
  style: Option<CitationStyle>,
}

impl AttributionExtractor {
  pub fn new(style: Option<CitationStyle>) -> Self { Self { style } }

  /// One basic attribution per hit, in rank order.
  pub fn basic(&self, hits: &[SearchHit]) -> Vec<SourceAttribution> {
    hits.iter().map(basic_attribution).collect()
  }

  /// Enhanced attributions: one per entity attribution carried by a hit, or a
  /// single derived one when the hit has none.
  pub fn enhanced(&self, hits: &[SearchHit]) -> Vec<EnhancedSourceAttribution> {
    hits
      .iter()
      .flat_map(|hit| {
        let claims = &hit.relationship.metadata.entity_attributions;
        if claims.is_empty() {
          vec![self.derived(hit)]
        } else {
          claims.iter().map(|claim| from_claim(hit, claim)).collect()
        }
      })
      .collect()
  }

  fn derived(&self, hit: &SearchHit) -> EnhancedSourceAttribution {
    let evidence_text = excerpt(&hit.content(), EXCERPT_CHARS);
    let citation = match self.style {
      Some(style) => render(&CitationSource::from_hit(hit), style),
      None => plain_citation(hit, &evidence_text),
    };
    let src = &hit.relationship.source_attribution;
    EnhancedSourceAttribution {
      source: source_of(hit),
      artist: primary_entity(hit),
      content_type: hit.content_type().to_owned(),
      confidence: hit.relevance_score,
      evidence_text,
      evidence_type: "contextual".to_owned(),
      start_position: None,
      end_position: None,
      paragraph_number: None,
      url: hit.url().map(str::to_owned),
      published_date: src.published_date,
      citation: Some(citation),
      source_credibility: None,
      relationship_type: hit.relationship_type().map(str::to_owned),
    }
  }
}

fn source_of(hit: &SearchHit) -> String {
  hit.source_name().unwrap_or(UNKNOWN_SOURCE).to_owned()
}

fn primary_entity(hit: &SearchHit) -> Option<String> {
  hit.entities().first().map(|e| (*e).to_owned())
}

fn basic_attribution(hit: &SearchHit) -> SourceAttribution {
  SourceAttribution {
    source:            source_of(hit),
    artist:            primary_entity(hit),
    content_type:      hit.content_type().to_owned(),
    confidence:        hit.relevance_score,
    excerpt:           excerpt(&hit.content(), EXCERPT_CHARS),
    url:               hit.url().map(str::to_owned),
    published_date:    hit.relationship.source_attribution.published_date,
    relationship_type: hit.relationship_type().map(str::to_owned),
  }
}

fn from_claim(hit: &SearchHit, claim: &EntityAttribution) -> EnhancedSourceAttribution {
  let meta = &hit.relationship.metadata;
  EnhancedSourceAttribution {
    source:             source_of(hit),
    artist:             claim.entity.clone(),
    content_type:       hit.content_type().to_owned(),
    confidence:         claim.confidence.unwrap_or(hit.relevance_score),
    evidence_text:      claim
      .evidence
      .clone()
      .unwrap_or_else(|| excerpt(&hit.content(), EXCERPT_CHARS)),
    evidence_type:      meta.evidence_type.clone().unwrap_or_else(|| "contextual".to_owned()),
    start_position:     meta.chunk_start_position,
    end_position:       meta.chunk_end_position,
    paragraph_number:   meta.paragraph_numbers.first().copied(),
    url:                hit.url().map(str::to_owned),
    published_date:     hit.relationship.source_attribution.published_date,
    citation:           claim.citation.clone(),
    source_credibility: Some(meta.attribution_completeness.unwrap_or(0.0)),
    relationship_type:  hit.relationship_type().map(str::to_owned),
  }
}

/// `"<evidence>" from <title> by <author>, <source>` with the evidence and
/// title cut to 50 characters.
fn plain_citation(hit: &SearchHit, evidence_text: &str) -> String {
  let src = &hit.relationship.source_attribution;
  let title = src
    .title()
    .map(|t| excerpt(t, CITATION_EXCERPT_CHARS))
    .unwrap_or_else(|| "Unknown Title".to_owned());
  format!(
    "\"{}\" from {title} by {}, {}",
    excerpt(evidence_text, CITATION_EXCERPT_CHARS),
    src.author().unwrap_or("Unknown Author"),
    hit.source_name().unwrap_or(UNKNOWN_SOURCE),
  )
}

// ─── Scoring ─────────────────────────────────────────────────────────────────

/// Per-attribution evidence score in tenths, at most 10.
fn attribution_score(attr: &EnhancedSourceAttribution) -> u32 {
  let mut tenths = 0;
  if attr.evidence_text.chars().count() > 10 {
    tenths += 3;
  }
  if attr.url().is_some() {
    tenths += 2;
  }
  if attr.citation().is_some() {
    tenths += 2;
  }
  if attr.has_position() {
    tenths += 2;
  }
  if attr.confidence > 0.7 {
    tenths += 1;
  }
  tenths.min(10)
}

/// Has a citation, or enough fields to build one.
pub fn is_citation_ready(attr: &EnhancedSourceAttribution) -> bool {
  attr.citation().is_some()
    || (attr.url().is_some() && !attr.source.is_empty() && !attr.evidence_text.is_empty())
}

pub fn is_verifiable(attr: &EnhancedSourceAttribution) -> bool { attr.url().is_some() }

/// Averages over `attributions`; all zero when there are none.
pub fn score(attributions: &[EnhancedSourceAttribution]) -> AttributionQuality {
  if attributions.is_empty() {
    return AttributionQuality::default();
  }
  let n = attributions.len() as f64;
  let fraction = |pred: fn(&EnhancedSourceAttribution) -> bool| {
    attributions.iter().filter(|a| pred(a)).count() as f64 / n
  };
  AttributionQuality {
    attribution_quality:       attributions.iter().map(attribution_score).sum::<u32>() as f64
      / (10.0 * n),
    citation_readiness:        fraction(is_citation_ready),
    source_verification_score: fraction(is_verifiable),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use cartograph_core::relationship::{Relationship, RelationshipMetadata, SourceRef};

  use super::*;

  fn hit(rel: Relationship, relevance: f64) -> SearchHit {
    SearchHit {
      relationship:    Arc::new(rel),
      relevance_score: relevance,
      matched_text:    String::new(),
    }
  }

  fn dylan() -> Relationship {
    Relationship {
      source_entity: "Bob Dylan".into(),
      target_entity: "Woody Guthrie".into(),
      relationship_type: "influence".into(),
      evidence: "Dylan cited Guthrie as his greatest influence".into(),
      confidence: 0.9,
      source_attribution: SourceRef {
        source: "NPR".into(),
        url: Some("https://npr.org/x".into()),
        ..Default::default()
      },
      ..Default::default()
    }
  }

  fn bare(confidence: f64) -> EnhancedSourceAttribution {
    EnhancedSourceAttribution {
      source:             String::new(),
      artist:             None,
      content_type:       "article".into(),
      confidence,
      evidence_text:      String::new(),
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
  fn basic_attribution_reads_hit() {
    let attrs = AttributionExtractor::default().basic(&[hit(dylan(), 1.0)]);
    assert_eq!(attrs.len(), 1);
    let a = &attrs[0];
    assert_eq!(a.source, "NPR");
    assert_eq!(a.artist.as_deref(), Some("Bob Dylan"));
    assert_eq!(a.content_type, "article");
    assert_eq!(a.confidence, 1.0);
    assert_eq!(a.url.as_deref(), Some("https://npr.org/x"));
    assert_eq!(a.relationship_type.as_deref(), Some("influence"));
    assert!(a.excerpt.starts_with("Bob Dylan influence Woody Guthrie."));
  }

  #[test]
  fn unsourced_hit_is_unknown_source() {
    let attrs = AttributionExtractor::default().basic(&[hit(Relationship::default(), 0.5)]);
    assert_eq!(attrs[0].source, "Unknown Source");
    assert_eq!(attrs[0].artist, None);
  }

  #[test]
  fn derived_attribution_synthesizes_plain_citation() {
    let attrs = AttributionExtractor::default().enhanced(&[hit(dylan(), 1.0)]);
    assert_eq!(attrs.len(), 1);
    let a = &attrs[0];
    assert_eq!(a.evidence_type, "contextual");
    assert_eq!(
      a.citation.as_deref(),
      Some(
        "\"Bob Dylan influence Woody Guthrie. Dylan cited Gut...\" \
         from Unknown Title by Unknown Author, NPR"
      )
    );
  }

  #[test]
  fn derived_attribution_uses_configured_style() {
    let extractor = AttributionExtractor::new(Some(CitationStyle::Basic));
    let attrs = extractor.enhanced(&[hit(dylan(), 1.0)]);
    assert_eq!(
      attrs[0].citation.as_deref(),
      Some(
        "\"Bob Dylan - Woody Guthrie Relationship\" by Unknown Author, NPR - \
         https://npr.org/x [Mentions: Bob Dylan, Woody Guthrie]"
      )
    );
  }

  #[test]
  fn entity_attributions_expand_one_per_claim() {
    let mut rel = dylan();
    rel.metadata = RelationshipMetadata {
      evidence_type: Some("direct_quote".into()),
      entity_attributions: vec![
        EntityAttribution {
          entity:     Some("Bob Dylan".into()),
          evidence:   Some("\"Woody was my last idol\"".into()),
          confidence: Some(0.95),
          citation:   Some("Dylan, B. (1961)".into()),
        },
        EntityAttribution { entity: Some("Woody Guthrie".into()), ..Default::default() },
      ],
      paragraph_numbers: vec![4, 7],
      attribution_completeness: Some(0.85),
      ..Default::default()
    };
    let attrs = AttributionExtractor::default().enhanced(&[hit(rel, 0.5)]);

    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs[0].evidence_text, "\"Woody was my last idol\"");
    assert_eq!(attrs[0].evidence_type, "direct_quote");
    assert_eq!(attrs[0].confidence, 0.95);
    assert_eq!(attrs[0].paragraph_number, Some(4));
    assert_eq!(attrs[0].source_credibility, Some(0.85));
    assert_eq!(attrs[1].artist.as_deref(), Some("Woody Guthrie"));
    assert_eq!(attrs[1].confidence, 0.5);
    assert_eq!(attrs[1].citation, None);
    assert!(attrs[1].evidence_text.starts_with("Bob Dylan influence"));
  }

  #[test]
  fn no_attributions_score_zero() {
    assert_eq!(score(&[]), AttributionQuality::default());
  }

  #[test]
  fn absent_fields_score_zero() {
    let q = score(&[bare(0.5), bare(0.2)]);
    assert_eq!(q.attribution_quality, 0.0);
    assert_eq!(q.citation_readiness, 0.0);
    assert_eq!(q.source_verification_score, 0.0);
  }

  #[test]
  fn complete_fields_score_one() {
    let mut a = bare(0.9);
    a.source = "NPR".into();
    a.evidence_text = "Dylan cited Guthrie".into();
    a.url = Some("https://npr.org/x".into());
    a.citation = Some("NPR (2020)".into());
    a.paragraph_number = Some(2);
    let q = score(&[a.clone(), a]);
    assert_eq!(q.attribution_quality, 1.0);
    assert_eq!(q.citation_readiness, 1.0);
    assert_eq!(q.source_verification_score, 1.0);
  }

  #[test]
  fn scores_average_across_attributions() {
    let mut evidenced = bare(0.9);
    evidenced.evidence_text = "a long enough quote".into();
    let q = score(&[evidenced, bare(0.1)]);
    assert!((q.attribution_quality - 0.2).abs() < 1e-9);
  }

  #[test]
  fn url_source_and_evidence_make_citation_ready() {
    let mut a = bare(0.1);
    a.url = Some("https://npr.org/x".into());
    a.source = "NPR".into();
    assert!(!is_citation_ready(&a));
    a.evidence_text = "x".into();
    assert!(is_citation_ready(&a));
  }
}
