//! Column classification and relationship discovery.
//!
//! The inference system works in two explicit, independently testable stages:
//!
//! 1. **Column classification**: each raw column is classified as
//!    primary key, lookup, plain attribute, or phantom, using authoritative
//!    metadata when available and the wire naming convention otherwise.
//! 2. **Parent resolution**: for each lookup column, the parent entity is
//!    resolved from metadata-declared targets first, with a name-pattern
//!    fallback when metadata is unavailable.
//!
//! Nothing in this module ever resolves a parent to the literal string
//! `"unknown"`; an unresolvable column is reported with empty targets and a
//! warning instead.

pub mod classify;
pub mod discovery;
pub mod inflection;

pub use classify::{
    classify_columns, decorate_lookup, strip_lookup_decoration, ColumnClassification,
    ColumnDescriptor, ColumnKind,
};
pub use discovery::{discover_relationships, DiscoveredRelationship, ParentTargets};
pub use inflection::{pluralize, singularize};
