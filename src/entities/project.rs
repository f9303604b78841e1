//! Project entities and their nested collections.

use std::sync::{Arc, RwLock, RwLockReadGuard};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::accessor::{identity_string, Accessor};
use crate::collection::Collection;
use crate::descriptor::Descriptor;
use crate::entity::{Entity, EntityCore, RawObject};
use crate::error::{DataError, Result};
use crate::query::Query;

use super::commit::{Commit, CommitDescriptor};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct ProjectFields {
  #[serde(default)]
  name: String,
  #[serde(default)]
  slug: String,
}

fn parse_fields(raw: &RawObject) -> Result<ProjectFields> {
  serde_json::from_value(Value::Object(raw.clone())).map_err(|source| DataError::Malformed {
    entity: "project",
    source,
  })
}

pub struct Project {
  core: EntityCore,
  fields: RwLock<ProjectFields>,
}

impl Project {
  fn from_raw(accessor: &Arc<Accessor>, endpoint: &str, raw: &RawObject) -> Result<Self> {
    let identity = raw
      .get("projectid")
      .and_then(identity_string)
      .ok_or(DataError::MissingIdentity { field: "projectid" })?;
    let fields = parse_fields(raw)?;
    let endpoint = format!("{}/{}", endpoint, identity);

    Ok(Self {
      core: EntityCore::new(accessor, endpoint, identity),
      fields: RwLock::new(fields),
    })
  }

  pub fn name(&self) -> String {
    self.read().name.clone()
  }

  pub fn slug(&self) -> String {
    self.read().slug.clone()
  }

  /// The commits belonging to this project, resolved through the owning
  /// accessor as `<project endpoint>/commits`.
  pub async fn commits(&self, query: &Query) -> Result<Collection<Commit>> {
    self.core.get("commits", query, &CommitDescriptor).await
  }

  fn read(&self) -> RwLockReadGuard<'_, ProjectFields> {
    self.fields.read().unwrap_or_else(|e| e.into_inner())
  }
}

impl Entity for Project {
  fn type_name() -> &'static str {
    "project"
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
      self.core.mark_changed();
    }
    Ok(())
  }

  fn to_object(&self) -> RawObject {
    let fields = self.read();
    let mut obj = Map::new();
    obj.insert(
      "projectid".to_string(),
      Value::String(self.core.identity().to_string()),
    );
    obj.insert("name".to_string(), Value::String(fields.name.clone()));
    obj.insert("slug".to_string(), Value::String(fields.slug.clone()));
    obj
  }
}

/// Descriptor singleton for project collections.
#[derive(Clone)]
pub struct ProjectDescriptor;

impl Descriptor for ProjectDescriptor {
  type Entity = Project;

  const ARRAY_FIELD: &'static str = "projects";
  const IDENTITY_FIELD: &'static str = "projectid";

  fn parse(&self, accessor: &Arc<Accessor>, endpoint: &str, raw: &RawObject) -> Result<Project> {
    Project::from_raw(accessor, endpoint, raw)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::transport::mock::MockTransport;
  use serde_json::json;

  fn setup() -> (Arc<MockTransport>, Arc<Accessor>) {
    let transport = Arc::new(MockTransport::new());
    let accessor = Accessor::new(transport.clone());
    (transport, accessor)
  }

  #[tokio::test]
  async fn test_project_commits_resolves_the_nested_endpoint() {
    let (transport, accessor) = setup();
    transport.push(json!({
      "projects": [{ "projectid": 5, "name": "acme", "slug": "acme" }]
    }));
    transport.push(json!({
      "commits": [
        { "codebaseid": 7, "name": "n1", "slug": "s1", "projectid": 5, "commitid": "c1" }
      ]
    }));

    let projects = accessor
      .get("projects", &Query::new(), &ProjectDescriptor)
      .await
      .unwrap();
    let project = projects[0].clone();
    assert_eq!(project.identity(), "5");
    assert_eq!(project.name(), "acme");

    let commits = project.commits(&Query::new()).await.unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].projectid(), 5);

    assert_eq!(
      transport.requested_paths(),
      vec!["projects", "projects/5/commits"]
    );
  }

  #[tokio::test]
  async fn test_nested_commits_share_the_top_level_cache() {
    let (transport, accessor) = setup();
    transport.push(json!({
      "commits": [
        { "codebaseid": 7, "name": "n1", "slug": "s1", "projectid": 5, "commitid": "c1" }
      ]
    }));
    transport.push(json!({
      "projects": [{ "projectid": 5, "name": "acme", "slug": "acme" }]
    }));
    transport.push(json!({
      "commits": [
        { "codebaseid": 7, "name": "n2", "slug": "s1", "projectid": 5, "commitid": "c1" }
      ]
    }));

    let top_level = accessor
      .get("commits", &Query::new(), &CommitDescriptor)
      .await
      .unwrap();
    let projects = accessor
      .get("projects", &Query::new(), &ProjectDescriptor)
      .await
      .unwrap();
    let nested = projects[0].commits(&Query::new()).await.unwrap();

    // Same canonical instance through both endpoints, mutated in place
    assert!(Arc::ptr_eq(&top_level[0], &nested[0]));
    assert_eq!(top_level[0].name(), "n2");
    // One commit and one project cached
    assert_eq!(accessor.cached_count(), 2);
  }

  #[tokio::test]
  async fn test_project_round_trip() {
    let (transport, accessor) = setup();
    transport.push(json!({
      "projects": [{ "projectid": 5, "name": "acme", "slug": "acme" }]
    }));

    let projects = accessor
      .get("projects", &Query::new(), &ProjectDescriptor)
      .await
      .unwrap();
    let project = &projects[0];

    let snapshot = project.to_object();
    let version = project.core().version();
    project.update(&snapshot).unwrap();

    assert_eq!(project.to_object(), snapshot);
    assert_eq!(project.core().version(), version);
  }
}
