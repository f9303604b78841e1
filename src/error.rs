//! Error taxonomy for the data layer.
//!
//! Transport failures propagate unchanged from a resolve call; parse
//! failures abort the batch before any cache mutation. Both are
//! matchable so callers can tell a dead network from a bad payload.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = DataError> = std::result::Result<T, E>;

/// Errors surfaced by resolve calls and entity operations.
#[derive(Debug, Error)]
pub enum DataError {
  /// Network/HTTP-level failure; no cache mutation has occurred.
  #[error(transparent)]
  Transport(#[from] TransportError),

  /// List response envelope lacks the descriptor's array field.
  #[error("response envelope has no `{field}` array")]
  MissingArray { field: &'static str },

  /// A raw item lacks the descriptor's identity field, or its value is
  /// not a string or integer.
  #[error("raw item has no usable `{field}` identity value")]
  MissingIdentity { field: &'static str },

  /// A raw item's fields failed to deserialize.
  #[error("malformed {entity} payload: {source}")]
  Malformed {
    entity: &'static str,
    #[source]
    source: serde_json::Error,
  },

  /// A cache entry's concrete type does not match its key. Only possible
  /// when two entity types declare the same type name.
  #[error("cache entry for {entity} has a mismatched concrete type")]
  TypeConflict { entity: &'static str },

  /// Sub-resource query on an entity whose accessor has been dropped.
  #[error("data accessor is no longer alive")]
  Detached,

  /// The detached resolve task ended without producing a result.
  #[error("resolve task was cancelled")]
  Cancelled,

  #[error("config error: {0}")]
  Config(String),
}

/// Failures from the transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("unexpected status {status} from {url}")]
  Status { status: u16, url: String },

  #[error("invalid response body: {0}")]
  Body(String),

  #[error("{0}")]
  Other(String),
}
