//! Web API client module.
//!
//! Outbound HTTP against the data service's versioned OData endpoint:
//! entity definitions, lookup attribute targets, and record queries.

mod client;
mod error;

pub use client::{DataClient, QueryOptions};
pub use error::{ApiError, ApiResult};
