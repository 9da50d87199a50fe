//! The user resource: storage seam, file-backed store, demo roster and the
//! request-level service.

pub mod seed;
pub mod service;
pub mod store;

pub use service::UserService;
pub use store::{FileUserStore, UserStore};
