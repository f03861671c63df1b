//! Offline narrative renderer.
//!
//! Produces a rule-based answer from the ranked hits so the whole pipeline
//! runs without a model backend. The output always quotes the query, names
//! up to three sources, lists entities and ends in a recommendations section.

use std::fmt::Write as _;

use cartograph_core::{synthesis::QueryContext, text::thousands};

const TRANSCRIPT_SUFFIX: &str = ".Txt Analysis";

/// Known podcast transcript prefixes and their display names.
const SHOWS: &[(&str, &str)] = &[
  ("Fresh_Air", "NPR Fresh Air"),
  ("All_Songs_Considered", "NPR All Songs Considered"),
  ("Broken_Record", "Broken Record Podcast"),
  ("Sound_Opinions", "Sound Opinions"),
  ("Switched_On_Pop", "Switched On Pop"),
];

/// Turn a transcript-analysis file name such as
/// `All_Songs_Considered_153149635_New_Music_Friday.Txt Analysis` into a show
/// name. Anything else passes through untouched.
pub fn clean_source_label(source: &str) -> String {
  if !source.contains(TRANSCRIPT_SUFFIX) {
    return source.to_owned();
  }
  if let Some((_, show)) = SHOWS.iter().find(|(key, _)| source.contains(key)) {
    return (*show).to_owned();
  }
  source
    .replace(TRANSCRIPT_SUFFIX, "")
    .replace("_New_", "_")
    .split('_')
    .take(3)
    .collect::<Vec<_>>()
    .join(" ")
}

fn push_distinct(items: &mut Vec<String>, item: &str) {
  if !items.iter().any(|i| i == item) {
    items.push(item.to_owned());
  }
}

struct Digest {
  sources:       Vec<String>,
  entities:      Vec<String>,
  /// `(kind, first sentence)` for hits whose passage names a known kind.
  relationships: Vec<(&'static str, String)>,
}

fn digest(context: &QueryContext) -> Digest {
  let mut digest = Digest {
    sources:       Vec::new(),
    entities:      Vec::new(),
    relationships: Vec::new(),
  };

  for hit in context.search_results.iter().take(5) {
    let label = clean_source_label(hit.source_name().unwrap_or("Unknown Source"));
    push_distinct(&mut digest.sources, &label);

    for entity in hit.entities().into_iter().take(2) {
      push_distinct(&mut digest.entities, entity);
    }

    let content = hit.content();
    let kind = ["influence", "collaboration", "contemporary"]
      .into_iter()
      .find(|kind| content.contains(&format!(" {kind} ")));
    if let Some(kind) = kind {
      let sentence = content.split('.').next().unwrap_or_default().to_owned();
      digest.relationships.push((kind, sentence));
    }
  }

  digest.entities.truncate(8);
  digest
}

fn influence_answer(context: &QueryContext, digest: &Digest) -> String {
  let artist = context
    .query
    .replace("who influenced", "")
    .replace("influences", "")
    .replace('?', "");
  let artist = artist.trim();

  let mut out = format!(
    "After analyzing {artist}'s cultural footprint, their influences span multiple \
     genres and eras. Here's a comprehensive breakdown based on our {} documented \
     relationships:\n\n## 1. Primary Influences & Connections\n",
    thousands(context.total_relationships)
  );

  let influences: Vec<&String> = digest
    .relationships
    .iter()
    .filter(|(kind, _)| *kind == "influence")
    .map(|(_, text)| text)
    .collect();
  let listed: Vec<&String> = if influences.is_empty() {
    digest.relationships.iter().map(|(_, text)| text).collect()
  } else {
    influences
  };
  for text in listed.into_iter().take(3) {
    let _ = write!(out, "\n• {text}");
  }

  let _ = write!(
    out,
    "\n\n## 2. Cross-Media Context\n\
     These connections appear across {count} different sources including {first}, \
     providing multiple perspectives on these artistic relationships.\n\n\
     ## 3. Recommendations\n\
     → Trace the generational influence chains\n\
     → Discover parallel artists in similar movements\n\
     → Examine the cultural context of these connections\n\n\
     ### Summary\n\
     **Key sources**: {key}\n\
     **Total connections found**: {hits}",
    count = digest.sources.len(),
    first = first_n(&digest.sources, 2, ", "),
    key = first_n(&digest.sources, 3, ", "),
    hits = context.search_results.len(),
  );
  out
}

fn general_answer(context: &QueryContext, digest: &Digest) -> String {
  let mut out = format!(
    "Based on \"{}\", our analysis of {} documented relationships reveals {} \
     significant connections across multiple cultural domains.\n\n## 1. Key Discoveries\n",
    context.query,
    thousands(context.total_relationships),
    context.search_results.len()
  );

  for (i, (_, text)) in digest.relationships.iter().take(3).enumerate() {
    let _ = write!(out, "\n{}. {text}", i + 1);
  }

  if digest.entities.is_empty() {
    let _ = write!(
      out,
      "\n\n### Sources\n{}\n\n\
       ### Recommendations\n\
       → Try searching for specific artists\n\
       → Ask about musical movements or genres\n\
       → Explore collaboration networks",
      first_n(&digest.sources, 3, " | ")
    );
  } else {
    let _ = write!(
      out,
      "\n\n## 2. Artist Network\n{}\n\n\
       ## 3. Source Attribution\n{}\n\n\
       ### Recommendations\n\
       → Deep dive into specific artist relationships\n\
       → Trace influence patterns across genres\n\
       → Discover unexpected connections",
      first_n(&digest.entities, 5, ", "),
      first_n(&digest.sources, 3, " | ")
    );
  }
  out
}

fn first_n(items: &[String], n: usize, sep: &str) -> String {
  items.iter().take(n).map(String::as_str).collect::<Vec<_>>().join(sep)
}

/// Render an offline answer for `context`.
pub fn render_template(context: &QueryContext) -> String {
  let digest = digest(context);
  let lowered = context.query.to_lowercase();
  if lowered.contains("influence") || lowered.contains("who influenced") {
    influence_answer(context, &digest)
  } else {
    general_answer(context, &digest)
  }
}
