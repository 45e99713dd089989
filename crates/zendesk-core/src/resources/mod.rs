//! Thin resource wrappers.
//!
//! Each wrapper only chooses a method, a path and a body; all request
//! handling lives in the shared core.

pub mod search;
pub mod views;

pub use search::Search;
pub use views::Views;
