//! Prompt construction for the live synthesizer.
//!
//! Every hit handed over is rendered; bounding the prompt is done by the
//! caller choosing how many hits to pass, never by clipping hit text.

use std::fmt::Write as _;

use cartograph_core::{retrieve::SearchHit, synthesis::QueryContext, text::thousands};
use serde_json::json;

const PREAMBLE: &str = "\
# Cultural Cartographer Identity

You are a cultural cartographer and discovery engine who transforms every piece of media into a rich network of cross-platform connections. Like that friend who always knows the perfect next thing to explore.

## Your Mission
Transform search results into cultural discovery experiences that:
- Ground responses in documented relationships from reliable sources
- Weave in discovery pathways organically
- Provide cross-media recommendations (music → podcasts → books → documentaries)
- Maintain warm, knowledgeable tone
- Always include source attribution with URLs when available

## Response Guidelines
- Let the query guide your response style naturally
- For influence queries, provide rich cultural context and lineage
- For discovery queries, emphasize connections and pathways
- Always ground responses in the provided search results
- Include specific source attributions
- End with natural discovery suggestions

## Source Attribution
- Always cite sources with publication names
- Include URLs when provided in search results
- Note confidence levels for relationships
- Distinguish between different types of sources (reviews, interviews, analysis)

Remember: You're not just answering questions - you're opening doorways to cultural exploration.";

fn result_block(position: usize, hit: &SearchHit) -> String {
  let rel = &hit.relationship;
  let entities = hit.entities();
  let metadata = json!({
    "relationship_type": rel.relationship_type,
    "confidence": rel.confidence,
    "cultural_significance": rel.metadata.cultural_significance,
    "temporal_context": rel.temporal_text(),
  });

  format!(
    "\nResult {position}:\n\
     Content: {content}\n\
     Source: {source}\n\
     URL: {url}\n\
     Content Type: {content_type}\n\
     Similarity Score: {score:.3}\n\
     Entities: {entities}\n\
     Metadata: {metadata}\n",
    content = hit.content(),
    source = hit.source_name().unwrap_or("Unknown"),
    url = hit.url().unwrap_or("N/A"),
    content_type = hit.content_type(),
    score = hit.relevance_score,
    entities = if entities.is_empty() { "None".to_owned() } else { entities.join(", ") },
  )
}

/// Render the full prompt for `context`.
pub fn build_prompt(context: &QueryContext) -> String {
  let sources = if context.source_distribution.is_empty() {
    "Various".to_owned()
  } else {
    context
      .source_distribution
      .keys()
      .map(String::as_str)
      .collect::<Vec<_>>()
      .join(", ")
  };

  let mut prompt = String::with_capacity(4096);
  prompt.push_str(PREAMBLE);
  let _ = write!(
    prompt,
    "\n\n## Query Context\n\
     User Query: \"{query}\"\n\
     Total Relationships in Knowledge Base: {total}\n\
     Sources Available: {sources}\n\n\
     ## Search Results from Enhanced Knowledge Graph\n",
    query = context.query,
    total = thousands(context.total_relationships),
  );
  let blocks: Vec<String> = context
    .search_results
    .iter()
    .enumerate()
    .map(|(i, hit)| result_block(i + 1, hit))
    .collect();
  prompt.push_str(&blocks.join("\n"));
  let _ = write!(
    prompt,
    "\n\n## Your Task\n\
     Using the search results above, provide a Cultural Cartographer response to: \"{query}\"\n\n\
     Remember to:\n\
     1. Ground your response in the provided search results\n\
     2. Include specific source attributions with URLs when available\n\
     3. Weave in discovery pathways naturally\n\
     4. Provide cross-media recommendations\n\
     5. Maintain your warm, knowledgeable tone as a cultural cartographer\n\n\
     Response:",
    query = context.query,
  );
  prompt
}

#[cfg(test)]
mod tests {
  use std::{collections::BTreeMap, sync::Arc};

  use cartograph_core::relationship::{Relationship, SourceRef};

  use super::*;

  fn hit(source: &str, url: Option<&str>, score: f64) -> SearchHit {
    SearchHit {
      relationship:    Arc::new(Relationship {
        source_entity: "Bob Dylan".into(),
        target_entity: "Woody Guthrie".into(),
        relationship_type: "influence".into(),
        evidence: "Dylan cited Guthrie.".into(),
        confidence: 0.9,
        source_attribution: SourceRef {
          source: source.into(),
          url: url.map(Into::into),
          ..Default::default()
        },
        ..Default::default()
      }),
      relevance_score: score,
      matched_text:    String::new(),
    }
  }

  fn context(hits: Vec<SearchHit>) -> QueryContext {
    QueryContext {
      query:               "Bob Dylan influence".into(),
      search_results:      hits,
      total_relationships: 12_345,
      source_distribution: BTreeMap::from([("NPR".to_owned(), 10)]),
    }
  }

  #[test]
  fn renders_each_hit_as_labelled_block() {
    let prompt = build_prompt(&context(vec![
      hit("NPR", Some("https://npr.org/x"), 1.0),
      hit("Pitchfork", None, 0.5),
    ]));

    assert!(prompt.contains("Result 1:\nContent: Bob Dylan influence Woody Guthrie. Dylan cited Guthrie."));
    assert!(prompt.contains("URL: https://npr.org/x"));
    assert!(prompt.contains("Result 2:"));
    assert!(prompt.contains("URL: N/A"));
    assert!(prompt.contains("Similarity Score: 1.000"));
    assert!(prompt.contains("Similarity Score: 0.500"));
    assert!(prompt.contains("Entities: Bob Dylan, Woody Guthrie"));
    assert!(prompt.contains("Content Type: article"));
  }

  #[test]
  fn frames_query_and_corpus_scale() {
    let prompt = build_prompt(&context(vec![hit("NPR", None, 1.0)]));
    assert!(prompt.starts_with("# Cultural Cartographer Identity"));
    assert!(prompt.contains("User Query: \"Bob Dylan influence\""));
    assert!(prompt.contains("Total Relationships in Knowledge Base: 12,345"));
    assert!(prompt.contains("Sources Available: NPR"));
    assert!(prompt.contains("5. Maintain your warm"));
    assert!(prompt.ends_with("Response:"));
  }

  #[test]
  fn missing_distribution_reads_various() {
    let mut ctx = context(vec![]);
    ctx.source_distribution.clear();
    assert!(build_prompt(&ctx).contains("Sources Available: Various"));
  }
}
