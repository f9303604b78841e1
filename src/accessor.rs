//! The cache + query engine.
//!
//! Resolves endpoint/query/descriptor triples into identity-coherent
//! entity collections:
//! - one canonical in-memory instance per (entity type, identity)
//! - cache hits are updated in place so observers keep their references
//! - first-seen identities are parsed by the descriptor and inserted
//! - results preserve server-provided order
//!
//! The cache is a monotonically growing map with in-place value
//! mutation; entities never change type or identity. Eviction policy
//! belongs to the caller (see [`Accessor::evict`]).

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use crate::collection::Collection;
use crate::descriptor::Descriptor;
use crate::entity::{Entity, RawObject};
use crate::error::{DataError, Result};
use crate::query::Query;
use crate::transport::Transport;

/// One canonical instance per (entity type, identity value), regardless
/// of which endpoint surfaced it.
type CacheKey = (&'static str, String);
type CacheMap = HashMap<CacheKey, Arc<dyn Any + Send + Sync>>;

pub struct Accessor {
  transport: Arc<dyn Transport>,
  cache: Mutex<CacheMap>,
}

impl Accessor {
  pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
    Arc::new(Self {
      transport,
      cache: Mutex::new(HashMap::new()),
    })
  }

  /// Resolve `endpoint` + `query` into an ordered collection of the
  /// entities described by `descriptor`.
  ///
  /// The fetch and the cache application run as a detached task on the
  /// executor: a caller that drops its awaited result does not stop a
  /// fetch the transport completes from being applied to the cache for
  /// other observers.
  ///
  /// A transport failure propagates unchanged with no cache mutation.
  /// Every item's identity is validated before any cache write, so a
  /// malformed item aborts the whole batch and leaves the cache exactly
  /// as it was.
  pub async fn get<D>(
    self: &Arc<Self>,
    endpoint: &str,
    query: &Query,
    descriptor: &D,
  ) -> Result<Collection<D::Entity>>
  where
    D: Descriptor + Clone + 'static,
  {
    let (tx, rx) = oneshot::channel();
    let accessor = Arc::clone(self);
    let endpoint = endpoint.to_string();
    let query = query.clone();
    let descriptor = descriptor.clone();

    tokio::spawn(async move {
      let result = accessor.resolve(&endpoint, &query, &descriptor).await;
      // The caller may have gone away; the cache is already current
      let _ = tx.send(result);
    });

    rx.await.map_err(|_| DataError::Cancelled)?
  }

  async fn resolve<D: Descriptor>(
    self: &Arc<Self>,
    endpoint: &str,
    query: &Query,
    descriptor: &D,
  ) -> Result<Collection<D::Entity>> {
    debug!(endpoint, "resolving");

    let envelope = self.transport.get(endpoint, query).await?;
    let items = envelope
      .get(D::ARRAY_FIELD)
      .and_then(Value::as_array)
      .ok_or(DataError::MissingArray {
        field: D::ARRAY_FIELD,
      })?;

    // Extract every identity up front; nothing is applied until the
    // whole envelope has validated.
    let mut batch: Vec<(String, &RawObject)> = Vec::with_capacity(items.len());
    for item in items {
      let raw = item.as_object().ok_or(DataError::MissingIdentity {
        field: D::IDENTITY_FIELD,
      })?;
      let identity = raw
        .get(D::IDENTITY_FIELD)
        .and_then(identity_string)
        .ok_or(DataError::MissingIdentity {
          field: D::IDENTITY_FIELD,
        })?;
      batch.push((identity, raw));
    }

    // The lock spans the whole batch so a concurrent resolve for the
    // same identity cannot insert a duplicate. Never held across an
    // await.
    let mut resolved = Vec::with_capacity(batch.len());
    {
      let mut cache = self.cache_lock();
      for (identity, raw) in batch {
        let key = (D::Entity::type_name(), identity);
        match cache.get(&key) {
          Some(existing) => {
            let entity = existing
              .clone()
              .downcast::<D::Entity>()
              .map_err(|_| DataError::TypeConflict {
                entity: D::Entity::type_name(),
              })?;
            entity.update(raw)?;
            resolved.push(entity);
          }
          None => {
            let entity = Arc::new(descriptor.parse(self, endpoint, raw)?);
            cache.insert(key, entity.clone());
            resolved.push(entity);
          }
        }
      }
    }

    debug!(endpoint, count = resolved.len(), "resolved");
    Ok(Collection::new(resolved))
  }

  /// The canonical cached instance for an identity, if one exists.
  pub fn lookup<E: Entity>(&self, identity: &str) -> Option<Arc<E>> {
    self
      .cache_lock()
      .get(&(E::type_name(), identity.to_string()))
      .and_then(|entry| entry.clone().downcast::<E>().ok())
  }

  /// Drop the canonical instance for an identity.
  ///
  /// Eviction policy lives with the caller (e.g. unsubscription
  /// driven); existing handles stay valid but the next resolve for this
  /// identity constructs a fresh instance.
  pub fn evict<E: Entity>(&self, identity: &str) -> bool {
    self
      .cache_lock()
      .remove(&(E::type_name(), identity.to_string()))
      .is_some()
  }

  /// Number of cached entity instances across all types.
  pub fn cached_count(&self) -> usize {
    self.cache_lock().len()
  }

  fn cache_lock(&self) -> MutexGuard<'_, CacheMap> {
    // A panic while holding the lock leaves the map structurally
    // intact; recover rather than poison every later resolve.
    self.cache.lock().unwrap_or_else(|e| e.into_inner())
  }
}

/// Canonical string form of an identity value. Identities arrive as
/// strings or integers depending on the endpoint.
pub(crate) fn identity_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}
