//! Commit entities.
//!
//! A commit is identified by its `commitid`; everything else is an
//! observable field that refetches overwrite in place.

use std::sync::{Arc, RwLock, RwLockReadGuard};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::accessor::{identity_string, Accessor};
use crate::descriptor::Descriptor;
use crate::entity::{Entity, EntityCore, RawObject};
use crate::error::{DataError, Result};

/// Mutable observable fields. The identity (`commitid`) lives in the
/// core and is never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct CommitFields {
  #[serde(default)]
  codebaseid: u64,
  #[serde(default)]
  name: String,
  #[serde(default)]
  slug: String,
  #[serde(default)]
  projectid: u64,
}

fn parse_fields(raw: &RawObject) -> Result<CommitFields> {
  serde_json::from_value(Value::Object(raw.clone())).map_err(|source| DataError::Malformed {
    entity: "commit",
    source,
  })
}

pub struct Commit {
  core: EntityCore,
  fields: RwLock<CommitFields>,
}

impl Commit {
  fn from_raw(accessor: &Arc<Accessor>, endpoint: &str, raw: &RawObject) -> Result<Self> {
    let identity = raw
      .get("commitid")
      .and_then(identity_string)
      .ok_or(DataError::MissingIdentity { field: "commitid" })?;
    // Two-phase construction: fields first, registration (cache
    // insertion) is the accessor's side of the handshake.
    let fields = parse_fields(raw)?;
    let endpoint = format!("{}/{}", endpoint, identity);

    Ok(Self {
      core: EntityCore::new(accessor, endpoint, identity),
      fields: RwLock::new(fields),
    })
  }

  pub fn codebaseid(&self) -> u64 {
    self.read().codebaseid
  }

  pub fn name(&self) -> String {
    self.read().name.clone()
  }

  pub fn slug(&self) -> String {
    self.read().slug.clone()
  }

  pub fn projectid(&self) -> u64 {
    self.read().projectid
  }

  fn read(&self) -> RwLockReadGuard<'_, CommitFields> {
    self.fields.read().unwrap_or_else(|e| e.into_inner())
  }
}

impl Entity for Commit {
  fn type_name() -> &'static str {
    "commit"
  }

  fn core(&self) -> &EntityCore {
    &self.core
  }

  fn update(&self, raw: &RawObject) -> Result<()> {
    let fresh = parse_fields(raw)?;
    let mut fields = self.fields.write().unwrap_or_else(|e| e.into_inner());
    if *fields != fresh {
      *fields = fresh;
      drop(fields);
      // One change event per batch of field writes
      self.core.mark_changed();
    }
    Ok(())
  }

  fn to_object(&self) -> RawObject {
    let fields = self.read();
    let mut obj = Map::new();
    obj.insert(
      "commitid".to_string(),
      Value::String(self.core.identity().to_string()),
    );
    obj.insert("codebaseid".to_string(), Value::from(fields.codebaseid));
    obj.insert("name".to_string(), Value::String(fields.name.clone()));
    obj.insert("slug".to_string(), Value::String(fields.slug.clone()));
    obj.insert("projectid".to_string(), Value::from(fields.projectid));
    obj
  }
}

/// Descriptor singleton for commit collections.
#[derive(Clone)]
pub struct CommitDescriptor;

impl Descriptor for CommitDescriptor {
  type Entity = Commit;

  const ARRAY_FIELD: &'static str = "commits";
  const IDENTITY_FIELD: &'static str = "commitid";

  fn parse(&self, accessor: &Arc<Accessor>, endpoint: &str, raw: &RawObject) -> Result<Commit> {
    Commit::from_raw(accessor, endpoint, raw)
  }
}
