//! Discovery pathways: suggested follow-up explorations.

use cartograph_core::{attribution::EnhancedSourceAttribution, retrieve::SearchHit};

const MAX_PATHWAYS: usize = 5;
const MAX_ENTITIES: usize = 10;
const MAX_TYPE_PATHWAYS: usize = 2;
const HIGH_CONFIDENCE: f64 = 0.8;

/// Suggestions offered when nothing matched.
pub const EMPTY_PATHWAYS: [&str; 3] = [
  "Try searching for mainstream artists",
  "Explore genre-based queries",
  "Ask about musical influences or collaborations",
];

/// Push `item` unless already present.
fn push_distinct<'a>(items: &mut Vec<&'a str>, item: &'a str) {
  if !items.contains(&item) {
    items.push(item);
  }
}

/// Entity pairs and relationship types seen in `hits`, first seen first.
pub fn basic(hits: &[SearchHit]) -> Vec<String> {
  let mut entities = Vec::new();
  let mut kinds = Vec::new();
  for hit in hits {
    for entity in hit.entities() {
      if entities.len() < MAX_ENTITIES {
        push_distinct(&mut entities, entity);
      }
    }
    if let Some(kind) = hit.relationship_type() {
      push_distinct(&mut kinds, kind);
    }
  }

  let mut pathways = Vec::new();
  if let [first, second, ..] = entities.as_slice() {
    pathways.push(format!("Explore connections between {first} and {second}"));
    pathways.push(format!("Discover who influenced {first}"));
    pathways.push(format!("Find artists similar to {first}"));
  }
  pathways.extend(
    kinds
      .iter()
      .take(MAX_TYPE_PATHWAYS)
      .map(|kind| format!("Explore more {kind} relationships")),
  );
  pathways.truncate(MAX_PATHWAYS);
  pathways
}

/// Pathways built only from well-evidenced attributions: confident entities,
/// credible sources and citable material.
pub fn enhanced(attributions: &[EnhancedSourceAttribution]) -> Vec<String> {
  let mut entities = Vec::new();
  let mut sources = Vec::new();
  for attr in attributions {
    if let Some(artist) = attr.artist.as_deref().filter(|_| attr.confidence > HIGH_CONFIDENCE) {
      push_distinct(&mut entities, artist);
    }
    if attr.source_credibility.is_some_and(|c| c > HIGH_CONFIDENCE) {
      push_distinct(&mut sources, attr.source.as_str());
    }
  }

  let mut pathways = Vec::new();
  if let [first, second, ..] = entities.as_slice() {
    pathways.push(format!("Explore verified connections between {first} and {second}"));
    pathways.push(format!("Find well-documented influences on {first}"));
    pathways.push(format!("Discover cited collaborations of {first}"));
  }
  pathways.extend(
    sources
      .iter()
      .take(2)
      .map(|source| format!("Explore more insights from {source}")),
  );
  if attributions.iter().filter(|a| a.citation().is_some()).count() > 2 {
    pathways.push("Find more academically citable sources".to_owned());
  }
  pathways.truncate(MAX_PATHWAYS);
  pathways
}
