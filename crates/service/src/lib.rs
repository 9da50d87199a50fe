//! Service layer providing the user CRUD operations on top of `models`.
//! - Separates request semantics from storage.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod storage;
pub mod users;
