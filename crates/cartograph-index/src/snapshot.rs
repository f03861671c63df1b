//! Knowledge-graph snapshot decoding.
//!
//! A snapshot is `{"relationships": [...], "enhancement_info": {...}}`. A bare
//! array of relationships is also accepted. Each record is decoded on its
//! own: a record that cannot be decoded at all is logged and skipped, while
//! records that merely lack fields load with empty defaults.

use std::path::Path;

use cartograph_core::relationship::Relationship;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::{Error, Result};

/// A decoded snapshot, ready to be swapped into a
/// [`RelationshipIndex`](crate::RelationshipIndex).
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub relationships:    Vec<Relationship>,
  pub enhancement_info: Option<Value>,
  /// Hex SHA-256 of the source document.
  pub fingerprint:      String,
  pub skipped:          usize,
}

impl Snapshot {
  /// Read and decode the snapshot file at `path`.
  pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|source| Error::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let snapshot = Self::from_slice(&bytes)?;
    info!(
      path = %path.display(),
      relationships = snapshot.relationships.len(),
      skipped = snapshot.skipped,
      "snapshot read"
    );
    Ok(snapshot)
  }

  pub fn from_slice(bytes: &[u8]) -> Result<Self> {
    let document: Value = serde_json::from_slice(bytes)?;
    Self::decode(document, fingerprint(bytes))
  }

  /// Decode an already-parsed document, e.g. a request body.
  pub fn from_value(document: Value) -> Result<Self> {
    let bytes = serde_json::to_vec(&document)?;
    Self::decode(document, fingerprint(&bytes))
  }

  /// Build a snapshot straight from records.
  pub fn from_relationships(relationships: Vec<Relationship>) -> Self {
    let fingerprint = serde_json::to_vec(&relationships)
      .map(|bytes| fingerprint(&bytes))
      .unwrap_or_default();
    Self { relationships, enhancement_info: None, fingerprint, skipped: 0 }
  }

  fn decode(document: Value, fingerprint: String) -> Result<Self> {
    let (records, enhancement_info) = match document {
      Value::Array(records) => (records, None),
      Value::Object(mut map) => {
        let records = match map.remove("relationships") {
          Some(Value::Array(records)) => records,
          Some(_) => {
            return Err(Error::InvalidSnapshot(
              "`relationships` is not an array".into(),
            ));
          }
          None => {
            return Err(Error::InvalidSnapshot(
              "missing `relationships` array".into(),
            ));
          }
        };
        let info = map.remove("enhancement_info").filter(|v| !v.is_null());
        (records, info)
      }
      _ => {
        return Err(Error::InvalidSnapshot(
          "expected an object or an array".into(),
        ));
      }
    };

    let mut relationships = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for (position, record) in records.into_iter().enumerate() {
      match serde_json::from_value::<Relationship>(record) {
        Ok(rel) => relationships.push(rel),
        Err(e) => {
          warn!(position, error = %e, "skipping undecodable relationship");
          skipped += 1;
        }
      }
    }

    Ok(Self { relationships, enhancement_info, fingerprint, skipped })
  }
}

fn fingerprint(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn object_snapshot_with_enhancement_info() {
    let snap = Snapshot::from_slice(
      br#"{"relationships":[{"source_entity":"A","target_entity":"B"}],
           "enhancement_info":{"version":"2"}}"#,
    )
    .unwrap();
    assert_eq!(snap.relationships.len(), 1);
    assert_eq!(snap.enhancement_info.unwrap()["version"], "2");
    assert_eq!(snap.fingerprint.len(), 64);
  }

  #[test]
  fn bare_array_is_accepted() {
    let snap = Snapshot::from_slice(br#"[{"source_entity":"A"}, {}]"#).unwrap();
    assert_eq!(snap.relationships.len(), 2);
    assert!(snap.enhancement_info.is_none());
  }

  #[test]
  fn undecodable_records_are_skipped() {
    let snap = Snapshot::from_slice(
      br#"{"relationships":[{"source_entity":"A"}, 42, {"confidence":"high"}]}"#,
    )
    .unwrap();
    assert_eq!(snap.relationships.len(), 1);
    assert_eq!(snap.skipped, 2);
  }

  #[test]
  fn null_fields_do_not_exclude_records() {
    let snap = Snapshot::from_slice(
      br#"[{"source_entity":"Bob Dylan","target_entity":"Woody Guthrie","evidence":null},
           {"source_entity":"Bob Dylan","target_entity":"Joan Baez","confidence":null},
           {"source_entity":"Bob Dylan","target_entity":"The Band","metadata":null,
            "source_attribution":null}]"#,
    )
    .unwrap();
    assert_eq!(snap.relationships.len(), 3);
    assert_eq!(snap.skipped, 0);
  }

  #[test]
  fn missing_relationships_is_an_error() {
    assert!(matches!(
      Snapshot::from_slice(br#"{"nodes":[]}"#),
      Err(Error::InvalidSnapshot(_))
    ));
    assert!(matches!(Snapshot::from_slice(b"not json"), Err(Error::Json(_))));
  }

  #[test]
  fn fingerprint_tracks_content() {
    let a = Snapshot::from_slice(br#"[{"source_entity":"A"}]"#).unwrap();
    let b = Snapshot::from_slice(br#"[{"source_entity":"B"}]"#).unwrap();
    let a2 = Snapshot::from_slice(br#"[{"source_entity":"A"}]"#).unwrap();
    assert_ne!(a.fingerprint, b.fingerprint);
    assert_eq!(a.fingerprint, a2.fingerprint);
  }
}
