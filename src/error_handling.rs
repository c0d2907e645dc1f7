//! Error types shared across the crate.
//!
//! Every user-facing failure is a typed enum whose `Display` output is the
//! message returned to API callers.

pub mod types;

pub use types::*;
