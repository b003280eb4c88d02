//! Slow-station penalty table.
//!
//! Configured as a comma-separated list in one of two forms:
//!
//! - graded: `SVG=2,PBO=1`, every entry carries a penalty from 1 to 9
//! - legacy: `SVG,PBO`, bare codes, each worth a penalty of 1
//!
//! The first entry decides the form and every later entry must follow it.

use std::collections::HashMap;
use std::fmt;

use crate::domain::{Crs, InvalidCrs};

/// How the table was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyMode {
    /// Every entry is `CODE=N`.
    Graded,
    /// Every entry is a bare code.
    Legacy,
}

impl fmt::Display for PenaltyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PenaltyMode::Graded => "CODE=N",
            PenaltyMode::Legacy => "bare CODE",
        })
    }
}

/// A penalty entry that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PenaltyError {
    /// Entry form differs from the first entry
    #[error("entry {token:?} mixes forms: expected {expected} like the first entry")]
    MixedModes { token: String, expected: PenaltyMode },

    /// Penalty is not an integer
    #[error("entry {token:?}: penalty is not a number")]
    InvalidPenalty { token: String },

    /// Penalty outside 1-9
    #[error("entry {token:?}: penalty {value} out of range 1-9")]
    PenaltyOutOfRange { token: String, value: i64 },

    /// Station code is not a CRS code
    #[error("entry {token:?}: {source}")]
    InvalidStation {
        token: String,
        #[source]
        source: InvalidCrs,
    },
}

/// How slow a calling point makes a service, from 1 to 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Penalty(u8);

impl Penalty {
    /// Smallest penalty, also used for every legacy entry.
    pub const MIN: Penalty = Penalty(1);

    /// Largest penalty.
    pub const MAX: Penalty = Penalty(9);

    /// Create a penalty, returning `None` outside 1-9.
    pub fn new(value: i64) -> Option<Self> {
        (1..=9).contains(&value).then(|| Penalty(value as u8))
    }

    /// Returns the numeric penalty.
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Validated station → penalty mapping.
///
/// # Examples
///
/// ```
/// use departure_board::classify::PenaltyTable;
/// use departure_board::domain::Crs;
///
/// let table = PenaltyTable::parse("SVG=2,PBO=1").unwrap();
/// assert_eq!(table.get(&Crs::parse("SVG").unwrap()).unwrap().value(), 2);
///
/// assert!(PenaltyTable::parse("SVG=2,PBO").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PenaltyTable {
    entries: HashMap<Crs, Penalty>,
    mode: Option<PenaltyMode>,
}

impl PenaltyTable {
    /// A table that marks nothing as slow.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the table, reporting every bad entry.
    ///
    /// Empty entries are skipped, so an empty string gives an empty table.
    /// A station listed twice keeps its highest penalty.
    pub fn parse(text: &str) -> Result<Self, Vec<PenaltyError>> {
        let mut table = Self::default();
        let mut errors = Vec::new();

        for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match table.parse_entry(token) {
                Ok((crs, penalty)) => {
                    let slot = table.entries.entry(crs).or_insert(penalty);
                    *slot = (*slot).max(penalty);
                }
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(table)
        } else {
            Err(errors)
        }
    }

    /// Parse one entry, fixing the table's mode if this is the first.
    fn parse_entry(&mut self, token: &str) -> Result<(Crs, Penalty), PenaltyError> {
        let (code, value) = match token.split_once('=') {
            Some((code, value)) => (code, Some(value.trim())),
            None => (token, None),
        };

        let entry_mode = if value.is_some() {
            PenaltyMode::Graded
        } else {
            PenaltyMode::Legacy
        };
        let expected = *self.mode.get_or_insert(entry_mode);
        if expected != entry_mode {
            return Err(PenaltyError::MixedModes {
                token: token.to_string(),
                expected,
            });
        }

        let crs = Crs::parse_config(code).map_err(|source| PenaltyError::InvalidStation {
            token: token.to_string(),
            source,
        })?;

        let penalty = match value {
            None => Penalty::MIN,
            Some(value) => {
                let value: i64 = value.parse().map_err(|_| PenaltyError::InvalidPenalty {
                    token: token.to_string(),
                })?;
                Penalty::new(value).ok_or_else(|| PenaltyError::PenaltyOutOfRange {
                    token: token.to_string(),
                    value,
                })?
            }
        };

        Ok((crs, penalty))
    }

    /// Penalty for a station, if it is listed.
    pub fn get(&self, station: &Crs) -> Option<Penalty> {
        self.entries.get(station).copied()
    }

    /// The form the table was written in, or `None` if empty.
    pub fn mode(&self) -> Option<PenaltyMode> {
        if self.entries.is_empty() {
            None
        } else {
            self.mode
        }
    }

    /// Number of listed stations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no station is listed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
