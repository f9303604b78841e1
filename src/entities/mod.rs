//! Concrete entity types and their descriptors.
//!
//! Each type declares its observable fields, its own parsing and
//! serialization, and typed helpers for its nested sub-resources. The
//! fetch/cache mechanics live entirely in the accessor; a new entity
//! type is a field struct, an `Entity` impl, and a descriptor.

mod commit;
mod project;

pub use commit::{Commit, CommitDescriptor};
pub use project::{Project, ProjectDescriptor};
