//! # Periscope
//!
//! Schema metadata and relationship discovery for components that bind to a
//! remote relational data service exposed over an HTTP/OData-style API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  DataClient (Web API)                    │
//! │   EntityDefinitions · lookup targets · record queries    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata]
//! ┌─────────────────────────────────────────────────────────┐
//! │        MetadataCache (coalesced, session-lifetime)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [inference]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Column Classifier  →  Relationship Discovery Engine    │
//! │   (PrimaryKey / Lookup / Attribute / Phantom)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │   Record Normalizer (canonical records for the host)     │
//! │   Diagnostic Translator (failed responses → hints)       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`engine::DiscoveryEngine`] facade owns the client and cache with an
//! explicit lifecycle: construct one per debugging session, drop it at exit.

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod inference;
pub mod metadata;
pub mod records;

pub use engine::{DiscoveryEngine, EngineError, EngineResult};
