//! Departure boards served from JSON files.
//!
//! Useful for development and for running the board without API
//! credentials. Boards are read from files named `{CRS}.json` (e.g.
//! `KGX.json`) and served as if they were live.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::{Crs, StationBoard};

use super::{DepartureSource, SourceError};

/// Departure source backed by a directory of JSON boards.
#[derive(Clone)]
pub struct JsonDepartureSource {
    dir: PathBuf,
    boards: Arc<RwLock<HashMap<Crs, StationBoard>>>,
}

impl JsonDepartureSource {
    /// Load every `{CRS}.json` file in `dir`.
    ///
    /// Files with other extensions are ignored. Any unreadable or invalid
    /// board file is an error.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref().to_path_buf();
        let boards = read_boards(&dir)?;
        Ok(Self {
            dir,
            boards: Arc::new(RwLock::new(boards)),
        })
    }

    /// Re-read the directory, replacing every board. Returns the number of
    /// boards loaded. On error the previous boards are kept.
    pub async fn reload(&self) -> Result<usize, SourceError> {
        let boards = read_boards(&self.dir)?;
        let count = boards.len();
        *self.boards.write().await = boards;
        Ok(count)
    }

    /// Stations with a board, in code order.
    pub async fn stations(&self) -> Vec<Crs> {
        let mut stations: Vec<_> = self.boards.read().await.keys().copied().collect();
        stations.sort();
        stations
    }
}

impl DepartureSource for JsonDepartureSource {
    async fn fetch(&self, station: &Crs) -> Result<StationBoard, SourceError> {
        let boards = self.boards.read().await;
        boards
            .get(station)
            .cloned()
            .ok_or(SourceError::NotFound(*station))
    }
}

fn read_boards(dir: &Path) -> Result<HashMap<Crs, StationBoard>, SourceError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| SourceError::Io { path, source }
    };

    let mut boards = HashMap::new();

    for entry in std::fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let crs = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| Crs::parse(s).ok())
            .ok_or_else(|| SourceError::BadFileName(path.clone()))?;

        let json = std::fs::read_to_string(&path).map_err(io_error(path.as_path()))?;
        let board: StationBoard =
            serde_json::from_str(&json).map_err(|source| SourceError::Json {
                path: path.clone(),
                source,
            })?;

        if board.station_code != crs {
            warn!(
                file = %path.display(),
                station = %board.station_code,
                "Board file name and station code differ, using file name"
            );
        }

        debug!(station = %crs, departures = board.departures.len(), "Loaded board");
        boards.insert(crs, board);
    }

    if boards.is_empty() {
        warn!(dir = %dir.display(), "No departure boards found");
    }

    Ok(boards)
}
