pub mod box_content;
pub mod buyforme;
pub mod customer;
pub mod identifiers;

pub use box_content::*;
pub use buyforme::*;
pub use customer::*;
