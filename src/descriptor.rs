//! Per-entity-type parsing strategy.

use std::sync::Arc;

use crate::accessor::Accessor;
use crate::entity::{Entity, RawObject};
use crate::error::Result;

/// The strategy the accessor drives list decoding with: which envelope
/// field holds the raw items, which item field is the identity key, and
/// how to construct a first-seen instance.
///
/// One stateless unit-struct value per entity type; all satisfy this
/// protocol by composition, with no shared implementation. The accessor
/// calls `parse` only for identities it has never seen; cache hits are
/// routed into [`Entity::update`] instead.
pub trait Descriptor: Send + Sync {
  type Entity: Entity;

  /// Envelope field holding the raw item array, e.g. "commits".
  const ARRAY_FIELD: &'static str;

  /// Raw-item field holding the identity value, e.g. "commitid".
  const IDENTITY_FIELD: &'static str;

  /// Construct a fully populated entity for a first-seen identity.
  ///
  /// `endpoint` is the collection endpoint the item came from; the
  /// entity derives its own resource path from it.
  fn parse(
    &self,
    accessor: &Arc<Accessor>,
    endpoint: &str,
    raw: &RawObject,
  ) -> Result<Self::Entity>;
}
