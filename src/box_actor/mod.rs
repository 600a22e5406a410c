//! Warehouse box contents: per-item pipeline from arrival to delivery.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
