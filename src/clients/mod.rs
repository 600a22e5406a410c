//! Typed clients over the generic resource actors.
//!
//! Each client converts framework failures into its domain error and adds
//! the orchestration that spans collections (customer checks, unique
//! request numbers, ownership checks).

#[macro_use]
mod macros;
mod box_client;
mod buyforme_client;
mod customer_client;

pub use box_client::*;
pub use buyforme_client::*;
pub use customer_client::*;
