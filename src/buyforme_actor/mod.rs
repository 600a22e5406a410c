//! BuyForMe request workflow: status transitions, cancellation and the audit trail.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
