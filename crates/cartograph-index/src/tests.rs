//! Integration tests for `RelationshipIndex` against small in-memory corpora.

use cartograph_core::{
  relationship::{Relationship, SourceRef},
  retrieve::{Retriever, SearchQuery},
};

use crate::{Error, RelationshipIndex, Snapshot};

fn rel(source: &str, kind: &str, target: &str, publisher: &str, confidence: f64) -> Relationship {
  Relationship {
    source_entity: source.into(),
    target_entity: target.into(),
    relationship_type: kind.into(),
    confidence,
    source_attribution: SourceRef { source: publisher.into(), ..Default::default() },
    ..Default::default()
  }
}

fn index(relationships: Vec<Relationship>) -> RelationshipIndex {
  RelationshipIndex::with_snapshot(Snapshot::from_relationships(relationships))
}

fn dylan_guthrie() -> Relationship {
  Relationship {
    evidence: "Dylan cited Guthrie as his greatest influence".into(),
    source_attribution: SourceRef {
      source: "NPR".into(),
      url: Some("https://npr.org/x".into()),
      ..Default::default()
    },
    ..rel("Bob Dylan", "influence", "Woody Guthrie", "NPR", 0.9)
  }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unloaded_index_reports_not_loaded() {
  let idx = RelationshipIndex::new();
  assert!(!idx.is_loaded().await);
  assert!(matches!(
    idx.search(&SearchQuery::new("dylan", 5)).await,
    Err(Error::NotLoaded)
  ));
  assert!(matches!(idx.summary().await, Err(Error::NotLoaded)));
  assert!(matches!(idx.sources().await, Err(Error::NotLoaded)));
}

#[tokio::test]
async fn empty_corpus_returns_no_hits() {
  let idx = index(vec![]);
  assert!(idx.is_loaded().await);
  let hits = idx.search(&SearchQuery::new("anything", 5)).await.unwrap();
  assert!(hits.is_empty());
}

#[tokio::test]
async fn blank_query_returns_no_hits() {
  let idx = index(vec![dylan_guthrie()]);
  let hits = idx.search(&SearchQuery::new("   ", 5)).await.unwrap();
  assert!(hits.is_empty());
}

#[tokio::test]
async fn replace_swaps_whole_corpus() {
  let idx = index(vec![dylan_guthrie()]);
  let before = idx.summary().await.unwrap();

  let summary = idx
    .replace(Snapshot::from_relationships(vec![
      rel("Nina Simone", "influence", "Lauryn Hill", "Guardian", 0.8),
      rel("Prince", "collaboration", "Sheila E.", "Billboard", 0.7),
    ]))
    .await;

  assert_eq!(summary.total_relationships, 2);
  assert_ne!(summary.snapshot_id, before.snapshot_id);
  assert!(idx.search(&SearchQuery::new("dylan", 5)).await.unwrap().is_empty());
  assert_eq!(idx.search(&SearchQuery::new("simone", 5)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_reload_keeps_current_corpus() {
  let idx = index(vec![dylan_guthrie()]);
  let err = idx.reload_from("/nonexistent/snapshot.json").await.unwrap_err();
  assert!(matches!(err, Error::Io { .. }));
  assert_eq!(idx.search(&SearchQuery::new("dylan", 5)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn null_fields_load_and_stay_searchable() {
  let snapshot = Snapshot::from_slice(
    br#"{"relationships":[
      {"source_entity":"Bob Dylan","relationship_type":"influence",
       "target_entity":"Woody Guthrie","evidence":null,"confidence":0.9},
      {"source_entity":"Bob Dylan","relationship_type":"collaboration",
       "target_entity":"Joan Baez","confidence":null,"source_attribution":{"source":"NPR"}},
      {"source_entity":"Bob Dylan","relationship_type":"collaboration",
       "target_entity":"The Band","metadata":null,"source_attribution":null}
    ]}"#,
  )
  .unwrap();
  let idx = RelationshipIndex::with_snapshot(snapshot);

  assert_eq!(idx.summary().await.unwrap().total_relationships, 3);
  let query = SearchQuery::new("dylan", 5).with_min_confidence(0.0);
  let hits = idx.search(&query).await.unwrap();
  assert_eq!(hits.len(), 3);
  assert_eq!(hits[0].relationship.target_entity, "Woody Guthrie");
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_relationship_scores_full_relevance() {
  let idx = index(vec![dylan_guthrie()]);
  let hits = idx
    .search(&SearchQuery::new("Bob Dylan influence", 5))
    .await
    .unwrap();

  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].relevance_score, 1.0);
  assert_eq!(hits[0].source_name(), Some("NPR"));
  assert!(hits[0].matched_text.starts_with("bob dylan influence woody guthrie"));
}

#[tokio::test]
async fn partial_term_overlap_is_a_fraction() {
  let idx = index(vec![dylan_guthrie()]);
  let hits = idx
    .search(&SearchQuery::new("dylan coltrane", 5))
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].relevance_score, 0.5);
}

#[tokio::test]
async fn zero_overlap_is_excluded() {
  let idx = index(vec![dylan_guthrie()]);
  let hits = idx.search(&SearchQuery::new("coltrane", 5)).await.unwrap();
  assert!(hits.is_empty());
}

#[tokio::test]
async fn more_matched_terms_rank_higher() {
  let idx = index(vec![
    rel("Bob Dylan", "covered", "Odetta", "NPR", 0.95),
    rel("Bob Dylan", "influence", "Woody Guthrie", "NPR", 0.5),
  ]);
  let hits = idx
    .search(&SearchQuery::new("dylan guthrie influence", 5))
    .await
    .unwrap();

  assert_eq!(hits.len(), 2);
  assert_eq!(hits[0].relationship.target_entity, "Woody Guthrie");
  assert!(hits[0].relevance_score >= hits[1].relevance_score);
}

#[tokio::test]
async fn confidence_breaks_relevance_ties() {
  let low = Relationship {
    evidence: "shared bill".into(),
    ..rel("Joni Mitchell", "collaboration", "Jaco Pastorius", "Pitchfork", 0.3)
  };
  let high = Relationship { confidence: 0.8, ..low.clone() };
  let idx = index(vec![low, high]);

  let hits = idx.search(&SearchQuery::new("joni jaco", 5)).await.unwrap();
  assert_eq!(hits.len(), 2);
  assert_eq!(hits[0].relationship.confidence, 0.8);
  assert_eq!(hits[1].relationship.confidence, 0.3);
}

#[tokio::test]
async fn results_truncate_to_k() {
  let corpus = (0..8)
    .map(|i| rel(&format!("Artist {i}"), "influence", "Nina Simone", "NPR", 0.5))
    .collect();
  let idx = index(corpus);
  let hits = idx.search(&SearchQuery::new("simone", 3)).await.unwrap();
  assert_eq!(hits.len(), 3);
}

// ─── Filters ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn source_filter_is_case_insensitive_substring() {
  let idx = index(vec![
    rel("Radiohead", "influence", "Can", "Pitchfork Media", 0.9),
    rel("Radiohead", "influence", "Pixies", "Rolling Stone", 0.9),
    rel("Radiohead", "influence", "R.E.M.", "pitchfork", 0.9),
  ]);
  let query = SearchQuery::new("radiohead", 10).with_source_filter(vec!["PITCHFORK".into()]);
  let hits = idx.search(&query).await.unwrap();

  assert_eq!(hits.len(), 2);
  assert!(hits.iter().all(|h| {
    h.relationship.source_attribution.source.to_lowercase().contains("pitchfork")
  }));
}

#[tokio::test]
async fn source_filter_entries_are_alternatives() {
  let idx = index(vec![
    rel("Radiohead", "influence", "Can", "Pitchfork", 0.9),
    rel("Radiohead", "influence", "Pixies", "NPR", 0.9),
    rel("Radiohead", "influence", "R.E.M.", "Billboard", 0.9),
  ]);
  let query = SearchQuery::new("radiohead", 10)
    .with_source_filter(vec!["pitchfork".into(), "npr".into()]);
  assert_eq!(idx.search(&query).await.unwrap().len(), 2);
}

#[tokio::test]
async fn entity_filter_matches_either_side() {
  let idx = index(vec![
    rel("Aretha Franklin", "covered", "Otis Redding", "NPR", 0.9),
    rel("Otis Redding", "influence", "Sam Cooke", "NPR", 0.9),
    rel("Sam Cooke", "influence", "Al Green", "NPR", 0.9),
  ]);
  let query = SearchQuery::new("influence covered", 10)
    .with_entity_filter(vec!["otis".into()]);
  let hits = idx.search(&query).await.unwrap();
  assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn min_confidence_rejects_weaker_relationships() {
  let idx = index(vec![dylan_guthrie()]);
  let query = SearchQuery::new("Bob Dylan influence", 5).with_min_confidence(0.95);
  assert!(idx.search(&query).await.unwrap().is_empty());
}

// ─── Corpus views ────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_counts_sources_types_and_confidence() {
  let idx = index(vec![
    rel("A", "influence", "B", "NPR", 0.9),
    rel("C", "influence", "D", "NPR", 0.65),
    rel("E", "collaboration", "F", "Billboard", 0.2),
    Relationship { source_entity: "G".into(), ..Default::default() },
  ]);
  let summary = idx.summary().await.unwrap();

  assert_eq!(summary.total_relationships, 4);
  assert_eq!(summary.source_distribution["NPR"], 2);
  assert_eq!(summary.source_distribution["Billboard"], 1);
  assert_eq!(summary.relationship_types["influence"], 2);
  assert_eq!(summary.confidence_distribution.high, 1);
  assert_eq!(summary.confidence_distribution.medium, 1);
  assert_eq!(summary.confidence_distribution.low, 2);
  assert!(summary.loaded_at.is_some());
}

#[tokio::test]
async fn sources_are_sorted_and_distinct() {
  let idx = index(vec![
    rel("A", "influence", "B", "Pitchfork", 0.9),
    rel("C", "influence", "D", "Billboard", 0.9),
    rel("E", "influence", "F", "Pitchfork", 0.9),
  ]);
  assert_eq!(idx.sources().await.unwrap(), vec!["Billboard", "Pitchfork"]);
}

#[tokio::test]
async fn entity_lookup_matches_substrings() {
  let idx = index(vec![
    rel("Bob Dylan", "influence", "Woody Guthrie", "NPR", 0.9),
    rel("Jakob Dylan", "related", "Bob Dylan", "NPR", 0.9),
    rel("Joan Baez", "collaboration", "Judy Collins", "NPR", 0.9),
  ]);
  assert_eq!(idx.relationships_for_entity("dylan").await.unwrap().len(), 2);
  assert!(idx.relationships_for_entity("  ").await.unwrap().is_empty());
  assert_eq!(idx.entity_count().await.unwrap(), 5);
}
