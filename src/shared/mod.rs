//! Shared Module
//!
//! Types used by every other module: the layout document model and its key
//! space, application configuration and the shared error type.

/// Layout document model
pub mod layout;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

pub use config::{AppConfig, AppConfigBuilder, ConfigError, StoreBackend};
pub use error::SharedError;
pub use layout::{HomeContent, Layout, Mode, RouteContent, StoreKey, HOME_ROUTE};
