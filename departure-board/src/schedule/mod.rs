//! When the display shows departures.
//!
//! Operators configure weekly *active* and *blank* hours as lists of
//! [`TimeRange`]s. A [`Schedule`] turns any instant into a
//! [`DisplayMode`]; it holds no state between calls, so the caller keeps
//! the previous mode if it wants to notice transitions.

mod day;
mod mode;
mod time_range;

pub use day::DayMask;
pub use mode::{
    BLANK_SENTINEL, CLOCK_SENTINEL, DisplayMode, OutOfHoursContent, RefreshInterval, Schedule,
};
pub use time_range::{ClockTime, InvalidRange, TimeRange, TimeRangeError, TimeRanges};
