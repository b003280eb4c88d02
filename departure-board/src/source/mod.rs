//! Where departure boards come from.
//!
//! The board only needs one operation from a data source: fetch the current
//! board for a station. [`DepartureSource`] is that seam; the controller is
//! generic over it so tests can count fetches.

mod json;

use std::future::Future;
use std::path::PathBuf;

use crate::domain::{Crs, StationBoard};

pub use json::JsonDepartureSource;

/// Errors from a departure source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source has no board for this station
    #[error("no departure board for station {0}")]
    NotFound(Crs),

    /// Reading a board file failed
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A board file is not valid board JSON
    #[error("failed to parse {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// File name is not `{CRS}.json`
    #[error("board file {0:?} is not named after a station code")]
    BadFileName(PathBuf),
}

/// Supplies departure boards.
pub trait DepartureSource {
    /// Fetch the current board for `station`.
    fn fetch(&self, station: &Crs) -> impl Future<Output = Result<StationBoard, SourceError>> + Send;
}
