//! Placeload Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging setup, and error handling for the placeload workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`PlaceloadError`] and the [`Result`] alias, plus the
//!   process exit codes each failure maps to
//! - **Logging**: tracing subscriber configuration shared by every binary
//! - **Types**: the place document written to the store
//!
//! # Example
//!
//! ```no_run
//! use placeload_common::{PlaceloadError, Result};
//! use placeload_common::types::PlaceDocument;
//!
//! fn require_key(doc: &PlaceDocument) -> Result<&str> {
//!     if doc.place_id.is_empty() {
//!         return Err(PlaceloadError::Config("place_id is empty".to_string()));
//!     }
//!     Ok(&doc.place_id)
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PlaceloadError, Result};
