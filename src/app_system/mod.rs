//! System orchestration, configuration, persistence and startup/shutdown logic.

pub mod config;
pub mod marketplace_system;
pub mod persistence;
pub mod tracing;

pub use config::*;
pub use marketplace_system::*;
pub use self::tracing::*;
