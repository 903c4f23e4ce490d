//! Identity Module
//!
//! Keystone v2.0 wire types and the password/tenant handshake.

pub mod auth;
pub mod types;

pub use auth::*;
pub use types::*;
