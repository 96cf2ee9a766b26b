//! Configuration types
//!
//! Board-agnostic node configuration, generated as constants at build time.

pub mod types;

pub use types::*;
