//! One-off data maintenance: splitting multi-item requests and verifying the result.

pub mod split;
pub mod verify;

pub use split::migrate_individual_requests;
pub use verify::verify;
