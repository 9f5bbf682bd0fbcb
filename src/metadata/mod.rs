//! Entity metadata: types, provider abstraction, and the session cache.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      MetadataCache                         │
//! │   per-key memoization · at-most-one in-flight fetch        │
//! └────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │                   MetadataProvider (trait)                 │
//! │   entity_metadata() · lookup_attribute()                   │
//! └────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │            WebApiMetadataProvider (DataClient)             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cache entries are immutable for the process lifetime; schema rarely
//! changes within a debugging session, so there is no invalidation.

mod cache;
mod provider;
mod types;
mod web_provider;

pub use cache::MetadataCache;
pub use provider::{MetadataError, MetadataProvider, MetadataResult};
pub use types::{EntityMetadata, LookupAttribute};
pub use web_provider::WebApiMetadataProvider;
