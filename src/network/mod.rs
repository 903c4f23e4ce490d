//! Network Module
//!
//! Local interface introspection used to guess the cloud endpoint host
//! when none is configured.

pub mod interfaces;

pub use interfaces::*;
