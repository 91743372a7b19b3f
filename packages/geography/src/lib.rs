#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Block group lookup for a query cell.
//!
//! Queries the `TIGERweb` `ArcGIS` REST service for Census block groups
//! intersecting the cell polygon, then resolves each one's overlap
//! weight (covered fraction + absolute covered area) in a planar
//! projection. Only block groups with an observable overlap survive.

pub mod overlap;
pub mod tigerweb;

use thiserror::Error;

pub use overlap::resolve_overlap;
pub use tigerweb::{TIGERWEB_BASE_URL, query_block_groups};

/// Errors from the spatial area lookup.
#[derive(Debug, Error)]
pub enum AreaLookupError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] gridstats_fetch::FetchError),

    /// The service returned an error object or a malformed response.
    #[error("TIGERweb error: {message}")]
    Service {
        /// Description of the service failure.
        message: String,
    },
}
