//! Pure builders and mappers between generic and native documents.
//!
//! Nothing in this module performs I/O. Every function takes the generic
//! input (and the adapter configuration where it matters) and returns the
//! native document, or takes a native response and returns the generic
//! result.

pub mod clauses;
mod delete;
mod patch;
mod query_builder;
mod response;
mod suggest;

pub use delete::{DeleteRequest, build_delete};
pub use patch::{AtomicUpdate, build_patch};
pub use query_builder::{NativeQuery, Paging, build_query};
pub use response::{ensure_success, response_find, response_get};
pub use suggest::{NativeSuggest, build_suggest};
