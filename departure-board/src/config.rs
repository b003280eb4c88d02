//! Board configuration.
//!
//! Everything is read once at startup into an immutable [`BoardConfig`].
//! Parsing never stops at the first mistake: every bad variable is
//! collected into [`ConfigErrors`] so the operator can fix them in one go.

use std::fmt;
use std::num::IntErrorKind;
use std::path::PathBuf;

use chrono::Duration;

use crate::classify::{CallingFilter, DepartureFilter, PenaltyError, PenaltyTable};
use crate::domain::{Crs, InvalidCrs};
use crate::schedule::{InvalidRange, RefreshInterval, Schedule, TimeRanges};

/// Board station CRS code (required).
pub const DEPART_FROM: &str = "DEPART_FROM";
/// Time ranges during which departures are shown.
pub const ACTIVE_TIMES: &str = "ACTIVE_TIMES";
/// Time ranges during which the display is blank. Wins over active times.
pub const BLANK_TIMES: &str = "BLANK_TIMES";
/// Name shown out of hours, or `_clock_` / `_blank_`.
pub const OUT_OF_HOURS_NAME: &str = "OUT_OF_HOURS_NAME";
/// Seconds between data refreshes.
pub const REFRESH_INTERVAL: &str = "REFRESH_INTERVAL";
/// Stations that mark a service as slow, with optional penalties.
pub const SLOW_STATIONS: &str = "SLOW_STATIONS";
/// Stations a service must call at (any of) to be shown.
pub const CALLING_AT: &str = "CALLING_AT";
/// Platform a service must depart from to be shown.
pub const PLATFORM: &str = "PLATFORM";
/// Services departing sooner than this many minutes are hidden.
pub const MIN_DEPARTURE_MIN: &str = "MIN_DEPARTURE_MIN";
/// Directory of `{CRS}.json` departure boards.
pub const DEPARTURES_DIR: &str = "DEPARTURES_DIR";

/// Departure board directory used when `DEPARTURES_DIR` is unset.
const DEFAULT_DEPARTURES_DIR: &str = "departures";

/// One bad configuration variable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required variable not set
    #[error("{var} is required")]
    Missing { var: &'static str },

    /// Station code is not a CRS code
    #[error("{var}: {source}")]
    InvalidStation {
        var: &'static str,
        #[source]
        source: InvalidCrs,
    },

    /// Time range list entry failed to parse
    #[error("{var}: {source}")]
    InvalidTimeRange {
        var: &'static str,
        #[source]
        source: InvalidRange,
    },

    /// Slow station entry failed to parse
    #[error("{var}: {source}")]
    InvalidPenalty {
        var: &'static str,
        #[source]
        source: PenaltyError,
    },

    /// Not an integer
    #[error("{var}: {value:?} is not a whole number")]
    InvalidNumber { var: &'static str, value: String },

    /// Integer outside the allowed range
    #[error("{var}: {value} must not be negative")]
    Negative { var: &'static str, value: i64 },

    /// Integer too large to use
    #[error("{var}: {value} is too large")]
    TooLarge { var: &'static str, value: i64 },
}

/// Every configuration error found at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl ConfigErrors {
    /// The individual errors.
    pub fn errors(&self) -> &[ConfigError] {
        &self.0
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.0.len();
        write!(
            f,
            "{count} configuration error{}",
            if count == 1 { "" } else { "s" }
        )?;
        for error in &self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

/// Everything the board needs, validated.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Station whose departures are shown.
    pub depart_from: Crs,

    /// Active and blank hours.
    pub schedule: Schedule,

    /// Out-of-hours name as configured, possibly a sentinel.
    pub out_of_hours_name: Option<String>,

    /// Data refresh cadence while active.
    pub refresh: RefreshInterval,

    /// Slow station penalties.
    pub penalties: PenaltyTable,

    /// Which departures are shown.
    pub filter: DepartureFilter,

    /// Where the JSON departure source reads boards from.
    pub departures_dir: PathBuf,
}

impl BoardConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigErrors> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigErrors>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let text = |var: &str| get(var).unwrap_or_default();
        let mut errors = Vec::new();

        let depart_from = match get(DEPART_FROM) {
            None => {
                errors.push(ConfigError::Missing { var: DEPART_FROM });
                None
            }
            Some(code) => Crs::parse_config(&code)
                .map_err(|source| {
                    errors.push(ConfigError::InvalidStation {
                        var: DEPART_FROM,
                        source,
                    })
                })
                .ok(),
        };

        let mut ranges = |var: &'static str| {
            TimeRanges::parse(&text(var)).unwrap_or_else(|bad| {
                errors.extend(
                    bad.into_iter()
                        .map(|source| ConfigError::InvalidTimeRange { var, source }),
                );
                TimeRanges::default()
            })
        };
        let active = ranges(ACTIVE_TIMES);
        let blank = ranges(BLANK_TIMES);

        let penalties = PenaltyTable::parse(&text(SLOW_STATIONS)).unwrap_or_else(|bad| {
            errors.extend(bad.into_iter().map(|source| ConfigError::InvalidPenalty {
                var: SLOW_STATIONS,
                source,
            }));
            PenaltyTable::empty()
        });

        let calling = CallingFilter::parse(&text(CALLING_AT)).unwrap_or_else(|bad| {
            errors.extend(bad.into_iter().map(|source| ConfigError::InvalidStation {
                var: CALLING_AT,
                source,
            }));
            CallingFilter::default()
        });

        let mut integer = |var: &'static str| -> Option<i64> {
            let value = get(var)?;
            parse_integer(&value)
                .ok_or_else(|| errors.push(ConfigError::InvalidNumber { var, value }))
                .ok()
        };

        let refresh = integer(REFRESH_INTERVAL)
            .map(RefreshInterval::clamped)
            .unwrap_or_default();

        let min_departure_mins = integer(MIN_DEPARTURE_MIN).unwrap_or(0);
        let min_departure = if min_departure_mins < 0 {
            errors.push(ConfigError::Negative {
                var: MIN_DEPARTURE_MIN,
                value: min_departure_mins,
            });
            Duration::zero()
        } else {
            Duration::try_minutes(min_departure_mins).unwrap_or_else(|| {
                errors.push(ConfigError::TooLarge {
                    var: MIN_DEPARTURE_MIN,
                    value: min_departure_mins,
                });
                Duration::zero()
            })
        };

        let filter = DepartureFilter {
            calling,
            platform: get(PLATFORM),
            min_departure,
        };

        match depart_from {
            Some(depart_from) if errors.is_empty() => Ok(Self {
                depart_from,
                schedule: Schedule::new(active, blank),
                out_of_hours_name: get(OUT_OF_HOURS_NAME),
                refresh,
                penalties,
                filter,
                departures_dir: get(DEPARTURES_DIR)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DEPARTURES_DIR)),
            }),
            _ => Err(ConfigErrors(errors)),
        }
    }
}

/// Parse a whole number, saturating values too large for an `i64`.
fn parse_integer(value: &str) -> Option<i64> {
    match value.parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}
