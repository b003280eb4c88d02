//! Display mode resolution.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;

use super::TimeRanges;

/// Out-of-hours name that shows only a clock.
pub const CLOCK_SENTINEL: &str = "_clock_";

/// Out-of-hours name that blanks the display.
pub const BLANK_SENTINEL: &str = "_blank_";

/// What the display should be doing at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// Showing departures; data is fetched.
    Active,
    /// Fully blank; no data is fetched.
    Blank,
    /// Outside active hours; clock or welcome screen, no data is fetched.
    OutOfHours,
}

impl DisplayMode {
    /// Returns true if departures should be fetched in this mode.
    pub fn fetches_data(self) -> bool {
        self == DisplayMode::Active
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisplayMode::Active => "ACTIVE",
            DisplayMode::Blank => "BLANK",
            DisplayMode::OutOfHours => "OUT_OF_HOURS",
        })
    }
}

/// Active and blank hours for the display.
///
/// Blank hours win over active hours. With no active hours configured the
/// display is active whenever it is not blank.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use departure_board::schedule::{DisplayMode, Schedule, TimeRanges};
///
/// let schedule = Schedule::new(
///     TimeRanges::parse("6-23").unwrap(),
///     TimeRanges::parse("sun:6-12").unwrap(),
/// );
///
/// // 2024-03-17 is a Sunday.
/// let sunday = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
/// assert_eq!(schedule.resolve(sunday.and_hms_opt(9, 0, 0).unwrap()), DisplayMode::Blank);
/// assert_eq!(schedule.resolve(sunday.and_hms_opt(13, 0, 0).unwrap()), DisplayMode::Active);
/// assert_eq!(schedule.resolve(sunday.and_hms_opt(23, 30, 0).unwrap()), DisplayMode::OutOfHours);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    active: TimeRanges,
    blank: TimeRanges,
}

impl Schedule {
    /// Create a schedule from active and blank ranges.
    pub fn new(active: TimeRanges, blank: TimeRanges) -> Self {
        Self { active, blank }
    }

    /// Ranges during which departures are shown.
    pub fn active(&self) -> &TimeRanges {
        &self.active
    }

    /// Ranges during which the display is blank.
    pub fn blank(&self) -> &TimeRanges {
        &self.blank
    }

    /// Resolve the display mode at `instant`.
    pub fn resolve(&self, instant: NaiveDateTime) -> DisplayMode {
        if self.blank.matches(instant) {
            DisplayMode::Blank
        } else if self.active.is_empty() || self.active.matches(instant) {
            DisplayMode::Active
        } else {
            DisplayMode::OutOfHours
        }
    }
}

/// What to show while out of hours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutOfHoursContent {
    /// Just the time.
    Clock,
    /// Nothing at all, same as blank mode.
    Blank,
    /// "Welcome to <name>" plus the time.
    Welcome(String),
}

impl OutOfHoursContent {
    /// Pick the out-of-hours content from the configured name.
    ///
    /// An empty or unset name falls back to `station_name`.
    pub fn resolve(configured: Option<&str>, station_name: &str) -> Self {
        match configured.map(str::trim).unwrap_or_default() {
            CLOCK_SENTINEL => OutOfHoursContent::Clock,
            BLANK_SENTINEL => OutOfHoursContent::Blank,
            "" => OutOfHoursContent::Welcome(station_name.to_string()),
            name => OutOfHoursContent::Welcome(name.to_string()),
        }
    }
}

/// How often departures are refetched while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshInterval(u64);

impl RefreshInterval {
    /// Shortest allowed interval, in seconds.
    pub const MIN_SECS: u64 = 15;

    /// Longest allowed interval, in seconds.
    pub const MAX_SECS: u64 = 3600;

    /// Interval used when none is configured, in seconds.
    pub const DEFAULT_SECS: u64 = 120;

    /// Build an interval, clamping into [15, 3600] seconds.
    pub fn clamped(secs: i64) -> Self {
        let clamped = secs.clamp(Self::MIN_SECS as i64, Self::MAX_SECS as i64);
        RefreshInterval(clamped as u64)
    }

    /// Interval in whole seconds.
    pub fn as_secs(self) -> u64 {
        self.0
    }

    /// Interval as a std duration.
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for RefreshInterval {
    fn default() -> Self {
        RefreshInterval(Self::DEFAULT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    /// Monday 2024-03-11 00:00 plus `mins`.
    fn at_minute(mins: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::minutes(mins)
    }

    fn schedule(active: &str, blank: &str) -> Schedule {
        Schedule::new(
            TimeRanges::parse(active).unwrap(),
            TimeRanges::parse(blank).unwrap(),
        )
    }

    #[test]
    fn empty_schedule_always_active() {
        let s = schedule("", "");
        for mins in (0..7 * 24 * 60).step_by(17) {
            assert_eq!(s.resolve(at_minute(mins)), DisplayMode::Active);
        }
    }

    #[test]
    fn blank_beats_overlapping_active() {
        let s = schedule("8-22", "12-13");
        assert_eq!(s.resolve(at_minute(12 * 60 + 30)), DisplayMode::Blank);
        assert_eq!(s.resolve(at_minute(11 * 60)), DisplayMode::Active);
        assert_eq!(s.resolve(at_minute(13 * 60)), DisplayMode::Active);
    }

    #[test]
    fn blank_only_schedule() {
        let s = schedule("", "1-6");
        assert_eq!(s.resolve(at_minute(3 * 60)), DisplayMode::Blank);
        assert_eq!(s.resolve(at_minute(7 * 60)), DisplayMode::Active);
    }

    #[test]
    fn outside_active_is_out_of_hours() {
        let s = schedule("8-22", "");
        assert_eq!(s.resolve(at_minute(22 * 60)), DisplayMode::OutOfHours);
        assert_eq!(s.resolve(at_minute(7 * 60 + 59)), DisplayMode::OutOfHours);
        assert_eq!(s.resolve(at_minute(8 * 60)), DisplayMode::Active);
    }

    #[test]
    fn overlapping_active_ranges_union() {
        let s = schedule("8-12,10-14,mon:2300-0100", "");
        assert_eq!(s.resolve(at_minute(13 * 60)), DisplayMode::Active);
        // Monday night into Tuesday.
        assert_eq!(s.resolve(at_minute(24 * 60 + 30)), DisplayMode::Active);
        assert_eq!(s.resolve(at_minute(24 * 60 + 90)), DisplayMode::OutOfHours);
    }

    #[test]
    fn wraparound_blank_overrides_next_morning() {
        let s = schedule("6-23", "fri:2200-0700");
        // Saturday 06:30 is inside Friday's blank range.
        let saturday_0630 = at_minute(5 * 24 * 60 + 6 * 60 + 30);
        assert_eq!(s.resolve(saturday_0630), DisplayMode::Blank);
        let saturday_0700 = at_minute(5 * 24 * 60 + 7 * 60);
        assert_eq!(s.resolve(saturday_0700), DisplayMode::Active);
    }

    #[test]
    fn only_active_fetches() {
        assert!(DisplayMode::Active.fetches_data());
        assert!(!DisplayMode::Blank.fetches_data());
        assert!(!DisplayMode::OutOfHours.fetches_data());
    }

    #[test]
    fn out_of_hours_content() {
        assert_eq!(
            OutOfHoursContent::resolve(Some("_clock_"), "Kings Cross"),
            OutOfHoursContent::Clock
        );
        assert_eq!(
            OutOfHoursContent::resolve(Some("_blank_"), "Kings Cross"),
            OutOfHoursContent::Blank
        );
        assert_eq!(
            OutOfHoursContent::resolve(None, "Kings Cross"),
            OutOfHoursContent::Welcome("Kings Cross".into())
        );
        assert_eq!(
            OutOfHoursContent::resolve(Some(""), "Kings Cross"),
            OutOfHoursContent::Welcome("Kings Cross".into())
        );
        assert_eq!(
            OutOfHoursContent::resolve(Some("Platform 9¾"), "Kings Cross"),
            OutOfHoursContent::Welcome("Platform 9¾".into())
        );
    }

    #[test]
    fn refresh_interval_clamps() {
        assert_eq!(RefreshInterval::clamped(5).as_secs(), 15);
        assert_eq!(RefreshInterval::clamped(9000).as_secs(), 3600);
        assert_eq!(RefreshInterval::clamped(-1).as_secs(), 15);
        assert_eq!(RefreshInterval::clamped(60).as_secs(), 60);
        assert_eq!(RefreshInterval::default().as_secs(), 120);
    }

    #[test]
    fn refresh_interval_conversions() {
        let interval = RefreshInterval::clamped(90);
        assert_eq!(interval.as_duration(), std::time::Duration::from_secs(90));
    }

    #[test]
    fn mode_display() {
        assert_eq!(DisplayMode::OutOfHours.to_string(), "OUT_OF_HOURS");
    }
}
