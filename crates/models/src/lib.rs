//! Domain types shared by the service and HTTP layers.

pub mod errors;
pub mod user;
