//! Generic entity base: identity, endpoint, and change notification.
//!
//! Every concrete entity type embeds an [`EntityCore`] carrying the
//! pieces the accessor needs regardless of field shape: a non-owning
//! back-reference to the accessor, the endpoint of this instance's own
//! resource, the identity value (set once, never overwritten), and a
//! version channel observers subscribe to for change notifications.

use std::any::Any;
use std::sync::{Arc, Weak};

use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::accessor::Accessor;
use crate::collection::Collection;
use crate::descriptor::Descriptor;
use crate::error::{DataError, Result};
use crate::query::Query;

/// Raw JSON object at the system boundary: a flat mapping from field
/// name to scalar/identifier value.
pub type RawObject = Map<String, Value>;

/// State shared by every entity type.
#[derive(Debug)]
pub struct EntityCore {
  accessor: Weak<Accessor>,
  endpoint: String,
  identity: String,
  changes: watch::Sender<u64>,
}

impl EntityCore {
  pub fn new(
    accessor: &Arc<Accessor>,
    endpoint: impl Into<String>,
    identity: impl Into<String>,
  ) -> Self {
    let (changes, _) = watch::channel(0);
    Self {
      accessor: Arc::downgrade(accessor),
      endpoint: endpoint.into(),
      identity: identity.into(),
      changes,
    }
  }

  /// Identity value; assigned at construction and never changed.
  pub fn identity(&self) -> &str {
    &self.identity
  }

  /// Resource path of this instance, e.g. "commits/c1".
  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }

  /// Subscribe to change notifications.
  ///
  /// The receiver observes a version counter that advances once per
  /// logical change, i.e. one `update` application that actually
  /// modified at least one field. Re-applying an identical payload does
  /// not advance it.
  pub fn subscribe(&self) -> watch::Receiver<u64> {
    self.changes.subscribe()
  }

  /// Current change version.
  pub fn version(&self) -> u64 {
    *self.changes.borrow()
  }

  /// Emit one change event covering a whole `update` batch.
  pub(crate) fn mark_changed(&self) {
    self.changes.send_modify(|v| *v += 1);
  }

  /// Fetch a related collection under this instance's endpoint.
  ///
  /// Resolves `endpoint + "/" + subpath` through the owning accessor,
  /// so e.g. a project at `projects/5` queries its commits as
  /// `projects/5/commits`. Entities never talk to the transport
  /// directly. Fails with [`DataError::Detached`] if the accessor has
  /// been dropped.
  pub async fn get<D>(
    &self,
    subpath: &str,
    query: &Query,
    descriptor: &D,
  ) -> Result<Collection<D::Entity>>
  where
    D: Descriptor + Clone + 'static,
  {
    let accessor = self.accessor.upgrade().ok_or(DataError::Detached)?;
    let endpoint = format!("{}/{}", self.endpoint, subpath);
    accessor.get(&endpoint, query, descriptor).await
  }
}

/// A locally cached object representing one remote resource instance.
///
/// Identity fields are assigned once at construction; `update`
/// overwrites only the mutable domain fields, in place, so observers
/// keep their references across refetches.
pub trait Entity: Any + Send + Sync + 'static {
  /// Type name used in the cache key, e.g. "commit". Must be unique
  /// across entity types sharing one accessor.
  fn type_name() -> &'static str
  where
    Self: Sized;

  fn core(&self) -> &EntityCore;

  /// Overwrite all non-identity observable fields from a raw payload.
  ///
  /// Idempotent: applying the same payload twice yields the same
  /// observable state, and only the first application emits a change
  /// event.
  fn update(&self, raw: &RawObject) -> Result<()>;

  /// Plain snapshot of current field values, identity included, using
  /// the raw payload's field names. Round-trips through `update`
  /// without loss.
  fn to_object(&self) -> RawObject;

  fn identity(&self) -> &str {
    self.core().identity()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entities::{Commit, CommitDescriptor};
  use crate::transport::mock::MockTransport;

  fn accessor() -> Arc<Accessor> {
    Accessor::new(Arc::new(MockTransport::new()))
  }

  #[tokio::test]
  async fn test_version_starts_at_zero_and_advances_on_change() {
    let accessor = accessor();
    let core = EntityCore::new(&accessor, "commits/c1", "c1");

    let rx = core.subscribe();
    assert_eq!(core.version(), 0);
    assert!(!rx.has_changed().unwrap());

    core.mark_changed();
    assert_eq!(core.version(), 1);
    assert!(rx.has_changed().unwrap());
  }

  #[tokio::test]
  async fn test_get_after_accessor_dropped_is_detached() {
    let accessor = accessor();
    let core = EntityCore::new(&accessor, "projects/5", "5");
    drop(accessor);

    let result: Result<Collection<Commit>> =
      core.get("commits", &Query::new(), &CommitDescriptor).await;
    assert!(matches!(result, Err(DataError::Detached)));
  }

  #[tokio::test]
  async fn test_subresource_endpoint_composition() {
    let transport = Arc::new(MockTransport::new());
    transport.push(serde_json::json!({ "commits": [] }));
    let accessor = Accessor::new(transport.clone());

    let core = EntityCore::new(&accessor, "projects/5", "5");
    core
      .get("commits", &Query::new().limit(3), &CommitDescriptor)
      .await
      .unwrap();

    assert_eq!(transport.requested_paths(), vec!["projects/5/commits?limit=3"]);
  }
}
