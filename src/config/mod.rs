//! Configuration module for Periscope.
//!
//! Handles data-service connection settings, environment variables, and
//! discovery tuning.

mod settings;

pub use settings::{
    expand_env_vars, DiscoverySettings, ServiceSettings, Settings, SettingsError,
};
