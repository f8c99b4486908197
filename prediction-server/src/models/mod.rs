//! Request/response bodies owned by the HTTP layer

pub mod prediction;

pub use prediction::*;
