//! Content database access

pub mod queries;

pub use queries::*;
