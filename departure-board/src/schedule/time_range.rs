//! Weekly recurring time ranges.
//!
//! A range is written `[<day>:]<start>-<end>`, for example `8-22`,
//! `weekday:0730-0930` or `fri:1930-0245`. Times are either hour-only
//! (`8`, `08`, `22`) or four-digit `HHMM`, and both ends of one range must
//! use the same form.
//!
//! Ranges are half-open: `8-22` covers 08:00:00 up to but not including
//! 22:00:00. When the end is earlier than the start the range runs past
//! midnight into the *following* day, and the day prefix names the day it
//! starts on: `fri:1930-0245` is Friday evening into Saturday morning.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDateTime, NaiveTime};

use super::DayMask;

/// Reason a single time range failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeRangeError {
    /// Day prefix not in the day vocabulary
    #[error("unknown day {0:?}")]
    UnknownDay(String),

    /// No `-` between start and end
    #[error("expected <start>-<end>")]
    MissingDash,

    /// Time is not 1, 2 or 4 digits
    #[error("invalid time {0:?}: expected H, HH or HHMM")]
    InvalidTime(String),

    /// One end is hour-only and the other is HHMM
    #[error("start and end must use the same time format")]
    MixedFormats,

    /// Hour above 23
    #[error("hour {0} out of range 0-23")]
    HourOutOfRange(u32),

    /// Minute above 59
    #[error("minute {0} out of range 0-59")]
    MinuteOutOfRange(u32),

    /// Start equals end
    #[error("start and end are the same time")]
    EmptyRange,

    /// Range applies to no day at all
    #[error("range has no days")]
    NoDays,
}

/// A token from a comma-separated list that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time range {token:?}: {source}")]
pub struct InvalidRange {
    /// The offending token, trimmed.
    pub token: String,
    /// What was wrong with it.
    #[source]
    pub source: TimeRangeError,
}

/// A time of day at minute resolution.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Create a clock time, validating hour and minute.
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeRangeError> {
        if hour > 23 {
            return Err(TimeRangeError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(TimeRangeError::MinuteOutOfRange(minute));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Returns the hour (0-23).
    pub fn hour(self) -> u32 {
        self.hour.into()
    }

    /// Returns the minute (0-59).
    pub fn minute(self) -> u32 {
        self.minute.into()
    }

    /// Converts to a chrono time with zero seconds.
    pub fn to_naive(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour, self.minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.hour, self.minute)
    }
}

/// How a time was written. Both ends of a range must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeFormat {
    /// `8`, `08`, `22`
    Hour,
    /// `0830`
    Hhmm,
}

fn parse_time(s: &str) -> Result<(ClockTime, TimeFormat), TimeRangeError> {
    let invalid = || TimeRangeError::InvalidTime(s.to_string());

    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let number = |digits: &str| digits.parse::<u32>().map_err(|_| invalid());

    match s.len() {
        1 | 2 => Ok((ClockTime::new(number(s)?, 0)?, TimeFormat::Hour)),
        4 => {
            let time = ClockTime::new(number(&s[..2])?, number(&s[2..])?)?;
            Ok((time, TimeFormat::Hhmm))
        }
        _ => Err(invalid()),
    }
}

/// A recurring weekly interval, optionally restricted to some days and
/// optionally running past midnight.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeRange {
    start: ClockTime,
    end: ClockTime,
    days: DayMask,
}

impl TimeRange {
    /// Create a range. Rejects `start == end` and an empty day set.
    pub fn new(days: DayMask, start: ClockTime, end: ClockTime) -> Result<Self, TimeRangeError> {
        if start == end {
            return Err(TimeRangeError::EmptyRange);
        }
        if days.is_empty() {
            return Err(TimeRangeError::NoDays);
        }
        Ok(Self { start, end, days })
    }

    /// Parse a single `[<day>:]<start>-<end>` token.
    ///
    /// # Examples
    ///
    /// ```
    /// use departure_board::schedule::TimeRange;
    ///
    /// let range = TimeRange::parse("fri:1930-0245").unwrap();
    /// assert!(range.wraps_midnight());
    ///
    /// assert!(TimeRange::parse("8-22").is_ok());
    /// assert!(TimeRange::parse("8-2200").is_err()); // mixed formats
    /// assert!(TimeRange::parse("0800-0800").is_err()); // empty
    /// assert!(TimeRange::parse("funday:8-9").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self, TimeRangeError> {
        let token = token.trim();

        let (days, times) = match token.split_once(':') {
            Some((day, rest)) => (
                DayMask::parse(day)
                    .ok_or_else(|| TimeRangeError::UnknownDay(day.trim().to_string()))?,
                rest,
            ),
            None => (DayMask::ALL, token),
        };

        let (start, end) = times.split_once('-').ok_or(TimeRangeError::MissingDash)?;
        let (start, start_format) = parse_time(start.trim())?;
        let (end, end_format) = parse_time(end.trim())?;

        if start_format != end_format {
            return Err(TimeRangeError::MixedFormats);
        }

        Self::new(days, start, end)
    }

    /// Days on which the range starts.
    pub fn days(&self) -> DayMask {
        self.days
    }

    /// Start time (inclusive).
    pub fn start(&self) -> ClockTime {
        self.start
    }

    /// End time (exclusive).
    pub fn end(&self) -> ClockTime {
        self.end
    }

    /// Returns true if the range ends on the day after it starts.
    pub fn wraps_midnight(&self) -> bool {
        self.end < self.start
    }

    /// Returns true if `instant` falls inside the range.
    pub fn matches(&self, instant: NaiveDateTime) -> bool {
        let day = instant.weekday();
        let time = instant.time();
        let start = self.start.to_naive();
        let end = self.end.to_naive();

        if self.wraps_midnight() {
            // [start, 24:00) on a listed day, then [00:00, end) the day after.
            (self.days.contains(day) && time >= start)
                || (self.days.contains(day.pred()) && time < end)
        } else {
            self.days.contains(day) && start <= time && time < end
        }
    }
}

impl fmt::Debug for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeRange({self})")
    }
}

/// Writes text that parses back to a range set with the same coverage.
///
/// Day sets with no single name are written as one token per day.
impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.days.prefix() {
            Some("") => write!(f, "{}-{}", self.start, self.end),
            Some(prefix) => write!(f, "{prefix}:{}-{}", self.start, self.end),
            None => {
                let tokens: Vec<String> = self
                    .days
                    .days()
                    .map(|day| TimeRange {
                        days: DayMask::single(day),
                        ..*self
                    })
                    .map(|range| range.to_string())
                    .collect();
                f.write_str(&tokens.join(","))
            }
        }
    }
}

/// A set of time ranges, matched as a union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeRanges {
    ranges: BTreeSet<TimeRange>,
}

impl TimeRanges {
    /// Parse a comma-separated list of ranges.
    ///
    /// Empty tokens are skipped, so an empty string gives an empty set.
    /// Every bad token is reported, not just the first.
    pub fn parse(text: &str) -> Result<Self, Vec<InvalidRange>> {
        let mut ranges = BTreeSet::new();
        let mut errors = Vec::new();

        for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match TimeRange::parse(token) {
                Ok(range) => {
                    ranges.insert(range);
                }
                Err(source) => errors.push(InvalidRange {
                    token: token.to_string(),
                    source,
                }),
            }
        }

        if errors.is_empty() {
            Ok(Self { ranges })
        } else {
            Err(errors)
        }
    }

    /// Returns true if no ranges are configured.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of distinct ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Iterate the ranges in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = &TimeRange> {
        self.ranges.iter()
    }

    /// Returns true if any range matches `instant`.
    pub fn matches(&self, instant: NaiveDateTime) -> bool {
        self.ranges.iter().any(|range| range.matches(instant))
    }
}

impl FromIterator<TimeRange> for TimeRanges {
    fn from_iter<I: IntoIterator<Item = TimeRange>>(iter: I) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for TimeRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.ranges.iter().map(ToString::to_string).collect();
        f.write_str(&tokens.join(","))
    }
}
