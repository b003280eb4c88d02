//! The per-tick board loop.
//!
//! Each tick resolves the display mode, fetches departures if the board is
//! active and the data is due (or the board has just become active), and
//! describes what the renderer should draw as a [`Frame`].

use chrono::NaiveDateTime;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::classify::{Annotated, ServiceAnnotator, ServiceClassifier};
use crate::config::BoardConfig;
use crate::domain::Crs;
use crate::schedule::{DisplayMode, OutOfHoursContent, RefreshInterval, Schedule};
use crate::source::DepartureSource;

use super::data::{DataState, StationData};

/// What the renderer should draw.
#[derive(Debug, Clone)]
pub enum Frame {
    /// Departure list.
    Departures {
        /// Board station name.
        station_name: String,
        /// Visible departures in board order, with their penalties.
        departures: Vec<Annotated>,
        /// Fetch state, for a status indicator.
        data_state: DataState,
    },
    /// Just the current time.
    Clock,
    /// "Welcome to <name>" plus the current time.
    Welcome(String),
    /// Nothing.
    Blank,
}

/// Drives one board station.
pub struct BoardController<S> {
    station: Crs,
    schedule: Schedule,
    refresh: RefreshInterval,
    out_of_hours_name: Option<String>,
    annotator: ServiceAnnotator,
    source: S,
    data: StationData,
    previous_mode: Option<DisplayMode>,
}

impl<S: DepartureSource> BoardController<S> {
    /// Create a controller from validated configuration.
    pub fn new(config: BoardConfig, source: S) -> Self {
        Self {
            station: config.depart_from,
            schedule: config.schedule,
            refresh: config.refresh,
            out_of_hours_name: config.out_of_hours_name,
            annotator: ServiceAnnotator::new(
                ServiceClassifier::new(config.penalties),
                config.filter,
            ),
            source,
            data: StationData::new(),
            previous_mode: None,
        }
    }

    /// Mode resolved on the last tick, if any.
    pub fn mode(&self) -> Option<DisplayMode> {
        self.previous_mode
    }

    /// Departure data held by the board.
    pub fn data(&self) -> &StationData {
        &self.data
    }

    /// The schedule in use.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Run one tick.
    ///
    /// `now` is local wall-clock time and picks the display mode. `instant`
    /// is monotonic and times the refresh cadence.
    pub async fn tick(&mut self, now: NaiveDateTime, instant: Instant) -> Frame {
        let mode = self.schedule.resolve(now);
        let previous = self.previous_mode.replace(mode);

        if previous != Some(mode) {
            info!(station = %self.station, "Transitioning display to {mode}");
        }

        if mode.fetches_data() {
            let entering_active = previous != Some(DisplayMode::Active);
            if entering_active || self.data.is_stale(instant, self.refresh) {
                self.refresh_data(instant).await;
            }
        }

        self.frame(mode, now)
    }

    async fn refresh_data(&mut self, instant: Instant) {
        debug!(station = %self.station, "Fetching departures");
        self.data.begin_fetch(instant);

        match self.source.fetch(&self.station).await {
            Ok(board) => {
                debug!(
                    station = %self.station,
                    departures = board.departures.len(),
                    "Fetched departures"
                );
                self.data.complete(board);
            }
            Err(e) => {
                warn!(station = %self.station, error = %e, "Failed to fetch departures");
                self.data.fail(e);
            }
        }
    }

    fn frame(&self, mode: DisplayMode, now: NaiveDateTime) -> Frame {
        match mode {
            DisplayMode::Blank => Frame::Blank,
            DisplayMode::Active => Frame::Departures {
                station_name: self.data.station_name().to_string(),
                departures: self
                    .annotator
                    .annotate_all(self.data.departures(), now)
                    .into_iter()
                    .filter(|a| a.visible)
                    .collect(),
                data_state: self.data.state(),
            },
            DisplayMode::OutOfHours => match OutOfHoursContent::resolve(
                self.out_of_hours_name.as_deref(),
                self.data.station_name(),
            ) {
                OutOfHoursContent::Clock => Frame::Clock,
                OutOfHoursContent::Blank => Frame::Blank,
                OutOfHoursContent::Welcome(name) => Frame::Welcome(name),
            },
        }
    }
}
