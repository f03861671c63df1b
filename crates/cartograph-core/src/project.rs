//! Projection of a relationship into flat, searchable text.
//!
//! The projection is a pure function of the record: identical input always
//! yields the identical string, fragments keep a fixed order, and absent
//! fragments are omitted rather than left blank. Case is preserved here and
//! folded only at search time.

use crate::relationship::Relationship;

/// Flatten `rel` into a single search string.
///
/// Fragment order:
/// 1. `"{source} {type} {target}"` when all three are non-empty
/// 2. evidence
/// 3. cultural context (from metadata)
/// 4. temporal context
/// 5. `"Source: {publisher}"`
pub fn project(rel: &Relationship) -> String {
  let mut fragments: Vec<String> = Vec::with_capacity(5);

  if !rel.source_entity.is_empty()
    && !rel.target_entity.is_empty()
    && !rel.relationship_type.is_empty()
  {
    fragments.push(format!(
      "{} {} {}",
      rel.source_entity, rel.relationship_type, rel.target_entity
    ));
  }

  if !rel.evidence.is_empty() {
    fragments.push(rel.evidence.clone());
  }

  if let Some(cultural) = rel
    .metadata
    .cultural_context
    .as_deref()
    .filter(|c| !c.is_empty())
  {
    fragments.push(cultural.to_owned());
  }

  if let Some(temporal) = rel.temporal_text() {
    fragments.push(temporal);
  }

  if let Some(source) = rel.source_name() {
    fragments.push(format!("Source: {source}"));
  }

  fragments.join(" ")
}
