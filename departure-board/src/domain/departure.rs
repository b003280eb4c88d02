//! Departure board types.
//!
//! A `StationBoard` is what the departure source hands back for one
//! station: its human-readable name plus the upcoming `Departure`s, each
//! with the ordered list of stations it calls at.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use super::Crs;

/// Raw statuses that the board shows as "On time".
const ON_TIME_STATUSES: &[&str] = &[
    "CHANGE OF IDENTITY",
    "CHANGE OF ORIGIN",
    "EARLY",
    "NO REPORT",
    "OFF ROUTE",
    "ON TIME",
    "REINSTATEMENT",
    "STARTS HERE",
];

/// A departure board for a single station.
#[derive(Debug, Clone, Deserialize)]
pub struct StationBoard {
    /// Station the board was fetched for.
    pub station_code: Crs,

    /// Human-readable station name, e.g. "London Kings Cross".
    pub station_name: String,

    /// Upcoming departures in board order.
    #[serde(default)]
    pub departures: Vec<Departure>,
}

/// One service leaving the board station.
#[derive(Debug, Clone, Deserialize)]
pub struct Departure {
    /// Opaque identifier from the data source.
    pub service_id: String,

    /// Timetabled departure time.
    #[serde(with = "hhmm")]
    pub scheduled_departure: NaiveTime,

    /// Current estimate, if the source has one.
    #[serde(default, with = "hhmm::option")]
    pub expected_departure: Option<NaiveTime>,

    /// Destination display name.
    pub destination: String,

    /// Platform number/letter, if known.
    #[serde(default)]
    pub platform: Option<String>,

    /// Status text as reported by the source, e.g. "LATE".
    #[serde(default)]
    pub status: String,

    /// Stations called at after the board station, in order.
    #[serde(default)]
    pub calling_points: Vec<Crs>,
}

impl Departure {
    /// Returns the best available departure time (expected if known, else scheduled).
    pub fn departure_time(&self) -> NaiveTime {
        self.expected_departure.unwrap_or(self.scheduled_departure)
    }

    /// Time from `now` until this service leaves.
    ///
    /// Board times carry no date. A time more than 12 hours before `now` is
    /// taken to be tomorrow, so a 00:10 departure seen at 23:50 is 20 minutes
    /// away rather than nearly a day ago.
    pub fn time_until(&self, now: NaiveDateTime) -> Duration {
        let delta = self.departure_time().signed_duration_since(now.time());
        if delta < -Duration::hours(12) {
            delta + Duration::days(1)
        } else if delta > Duration::hours(12) {
            delta - Duration::days(1)
        } else {
            delta
        }
    }

    /// Status line as shown on the board.
    pub fn display_status(&self) -> String {
        if let Some(expected) = self.expected_departure
            && expected != self.scheduled_departure
        {
            return format!("Exp {}", expected.format("%H:%M"));
        }

        if ON_TIME_STATUSES.contains(&self.status.as_str()) {
            "On time".to_string()
        } else if self.status == "LATE" {
            "DELAYED".to_string()
        } else {
            self.status.clone()
        }
    }
}

/// Serde helpers for board times written as "HH:MM".
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer};

    const FORMAT: &str = "%H:%M";

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            // Sources send words such as "On time" or "Cancelled" here
            // when there is no estimate.
            let s: Option<String> = Option::deserialize(deserializer)?;
            Ok(s.and_then(|s| NaiveTime::parse_from_str(&s, FORMAT).ok()))
        }
    }
}
