//! Storage abstractions for service layer
//!
//! Contains the reusable file-backed list store the user store is built on.

pub mod json_list_store;
