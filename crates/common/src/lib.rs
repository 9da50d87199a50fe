//! Shared plumbing for the user directory crates: logging setup, metrics
//! and small wire types.

pub mod types;
pub mod utils;
pub mod observability;
