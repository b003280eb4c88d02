//! Last fetched departure data for the board station.
//!
//! Refresh timing runs on the monotonic clock, so wall-clock jumps (daylight
//! saving, NTP corrections) never delay or hurry a fetch.

use tokio::time::Instant;

use crate::domain::{Departure, StationBoard};
use crate::schedule::RefreshInterval;

/// Name shown before the first successful fetch.
pub const UNKNOWN_STATION_NAME: &str = "Unknown Location";

/// Where the data is in its fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataState {
    /// Never fetched.
    Uninitialized,
    /// A fetch is in progress.
    Loading,
    /// Last fetch succeeded.
    Idle,
    /// Last fetch failed; older departures (if any) are still held.
    Error,
}

/// Departure data plus its fetch bookkeeping.
#[derive(Debug, Clone)]
pub struct StationData {
    state: DataState,
    board: Option<StationBoard>,
    last_attempt: Option<Instant>,
    last_error: Option<String>,
}

impl Default for StationData {
    fn default() -> Self {
        Self::new()
    }
}

impl StationData {
    /// Empty, never-fetched data.
    pub fn new() -> Self {
        Self {
            state: DataState::Uninitialized,
            board: None,
            last_attempt: None,
            last_error: None,
        }
    }

    /// Current fetch state.
    pub fn state(&self) -> DataState {
        self.state
    }

    /// Departures from the last good fetch, empty if there was none.
    pub fn departures(&self) -> &[Departure] {
        self.board
            .as_ref()
            .map(|b| b.departures.as_slice())
            .unwrap_or_default()
    }

    /// Station name from the last good fetch.
    pub fn station_name(&self) -> &str {
        self.board
            .as_ref()
            .map(|b| b.station_name.as_str())
            .unwrap_or(UNKNOWN_STATION_NAME)
    }

    /// Message from the most recent failed fetch, cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// When the last fetch was attempted.
    pub fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt
    }

    /// Returns true if a fetch is due at `now`.
    ///
    /// Failed attempts count too, so a failing source is retried at the
    /// refresh cadence rather than on every tick.
    pub fn is_stale(&self, now: Instant, interval: RefreshInterval) -> bool {
        if self.state == DataState::Loading {
            return false;
        }
        match self.last_attempt {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= interval.as_duration(),
        }
    }

    /// Mark a fetch as started at `now`.
    pub fn begin_fetch(&mut self, now: Instant) {
        self.state = DataState::Loading;
        self.last_attempt = Some(now);
    }

    /// Record a successful fetch.
    pub fn complete(&mut self, board: StationBoard) {
        self.state = DataState::Idle;
        self.board = Some(board);
        self.last_error = None;
    }

    /// Record a failed fetch, keeping any older board.
    pub fn fail(&mut self, error: impl ToString) {
        self.state = DataState::Error;
        self.last_error = Some(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;
    use std::time::Duration;

    use crate::domain::Crs;

    static ORIGIN: LazyLock<Instant> = LazyLock::new(Instant::now);

    fn at(mins: u64) -> Instant {
        *ORIGIN + Duration::from_secs(mins * 60)
    }

    fn board(name: &str) -> StationBoard {
        StationBoard {
            station_code: Crs::parse("KGX").unwrap(),
            station_name: name.to_string(),
            departures: Vec::new(),
        }
    }

    #[test]
    fn new_data_is_stale_and_unnamed() {
        let data = StationData::new();
        assert_eq!(data.state(), DataState::Uninitialized);
        assert!(data.is_stale(at(0), RefreshInterval::default()));
        assert_eq!(data.station_name(), UNKNOWN_STATION_NAME);
        assert!(data.departures().is_empty());
    }

    #[test]
    fn staleness_follows_interval() {
        let interval = RefreshInterval::clamped(120);
        let mut data = StationData::new();
        data.begin_fetch(at(0));
        data.complete(board("Kings Cross"));

        assert!(!data.is_stale(at(1), interval));
        assert!(data.is_stale(at(2), interval));
    }

    #[test]
    fn loading_is_never_stale() {
        let mut data = StationData::new();
        data.begin_fetch(at(0));
        assert_eq!(data.state(), DataState::Loading);
        assert!(!data.is_stale(at(60), RefreshInterval::default()));
    }

    #[test]
    fn failure_keeps_previous_board() {
        let mut data = StationData::new();
        data.begin_fetch(at(0));
        data.complete(board("Kings Cross"));
        data.begin_fetch(at(2));
        data.fail("timed out");

        assert_eq!(data.state(), DataState::Error);
        assert_eq!(data.station_name(), "Kings Cross");
        assert_eq!(data.last_error(), Some("timed out"));
        assert_eq!(data.last_attempt(), Some(at(2)));

        data.begin_fetch(at(4));
        data.complete(board("London Kings Cross"));
        assert_eq!(data.last_error(), None);
        assert_eq!(data.station_name(), "London Kings Cross");
    }

    #[test]
    fn earlier_instant_is_not_stale() {
        let mut data = StationData::new();
        data.begin_fetch(at(5));
        data.complete(board("Kings Cross"));

        assert!(!data.is_stale(at(0), RefreshInterval::clamped(120)));
        assert!(data.is_stale(at(7), RefreshInterval::clamped(120)));
    }
}
