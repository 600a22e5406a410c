//! Customer registry: the owners of boxes and BuyForMe requests.

pub mod entity;
pub mod error;

pub use error::*;
