//! Client-side mirror of remote REST resources.
//!
//! Resolves endpoint + query + descriptor triples into identity-stable,
//! observable entity collections:
//! - one canonical in-memory instance per remote identity
//! - in-place field mutation on refetch, one change event per update
//! - per-type descriptors instead of per-type fetch code
//! - composable relative endpoints for nested sub-resources
//!
//! # Example
//!
//! ```ignore
//! let config = Config::load(None)?;
//! let transport = Arc::new(HttpTransport::new(&config)?);
//! let accessor = Accessor::new(transport);
//!
//! let projects = accessor
//!   .get("projects", &Query::new().limit(20), &ProjectDescriptor)
//!   .await?;
//! let commits = projects[0].commits(&Query::new().order("-when_timestamp")).await?;
//!
//! // Re-resolving mutates the same instances; subscribers see one
//! // change event per update that actually modified a field.
//! let mut changes = commits[0].core().subscribe();
//! ```

pub mod accessor;
pub mod collection;
pub mod config;
pub mod descriptor;
pub mod entities;
pub mod entity;
pub mod error;
pub mod query;
pub mod transport;

pub use accessor::Accessor;
pub use collection::Collection;
pub use config::Config;
pub use descriptor::Descriptor;
pub use entity::{Entity, EntityCore, RawObject};
pub use error::{DataError, Result, TransportError};
pub use query::Query;
pub use transport::{HttpTransport, Transport};
