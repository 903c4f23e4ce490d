//! Storage Module
//!
//! Cinder resource types, request path construction and the helpers
//! behind bulk volume operations.

pub mod bulk;
pub mod query;
pub mod types;

pub use bulk::*;
pub use query::*;
pub use types::*;
