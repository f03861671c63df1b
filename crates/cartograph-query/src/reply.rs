//! Deterministic reply texts used when no narrative is synthesized.

use cartograph_core::{
  retrieve::SearchHit,
  text::{excerpt, thousands},
};

const FALLBACK_SHOWN: usize = 3;
const FALLBACK_EXCERPT_CHARS: usize = 150;

/// The top hits with their source, relevance and link.
pub fn fallback_text(query: &str, hits: &[SearchHit]) -> String {
  let mut lines = vec![
    format!(
      "Based on your query \"{query}\", I found {} relevant connections in our \
       enhanced knowledge graph:",
      hits.len()
    ),
    String::new(),
  ];

  for (i, hit) in hits.iter().take(FALLBACK_SHOWN).enumerate() {
    lines.push(format!(
      "**{}. From {} ({:.2} relevance):**",
      i + 1,
      hit.source_name().unwrap_or("Source"),
      hit.relevance_score
    ));
    lines.push(excerpt(&hit.content(), FALLBACK_EXCERPT_CHARS));
    if let Some(url) = hit.url() {
      lines.push(format!("[Read full article]({url})"));
    }
    lines.push(String::new());
  }

  if hits.len() > FALLBACK_SHOWN {
    lines.push(format!(
      "*Plus {} additional connections available*",
      hits.len() - FALLBACK_SHOWN
    ));
    lines.push(String::new());
  }

  lines.push(
    "**Note:** The Cultural Cartographer is temporarily unavailable, so I'm showing \
     direct search results from our knowledge graph. Each result includes source \
     attribution and confidence scores."
      .to_owned(),
  );
  lines.push(String::new());
  lines.push("What would you like to explore next?".to_owned());
  lines.join("\n")
}

/// Names the query and the corpus size, and suggests rephrasing.
pub fn empty_text(query: &str, total_relationships: usize) -> String {
  format!(
    "I couldn't find specific information about \"{query}\" in our current knowledge \
     graph. This could mean:\n\n\
     • The topic isn't covered in our sources (Billboard, Pitchfork, NPR, Guardian)\n\
     • Try rephrasing your query with different terms\n\
     • Ask about more mainstream artists or well-documented influences\n\n\
     Our knowledge graph contains {} relationships. What else would you like to explore?",
    thousands(total_relationships)
  )
}
