//! Common test utilities and helpers
//!
//! - Stateful fakes of the disk service and the GitHub contents API
//! - Layout document fixtures
//! - Session token helpers
//! - Optional database pool

#![allow(dead_code)]

pub mod auth_helpers;
pub mod database;
pub mod fixtures;
pub mod mock_server;

pub use auth_helpers::*;
pub use database::*;
pub use fixtures::*;
pub use mock_server::*;
