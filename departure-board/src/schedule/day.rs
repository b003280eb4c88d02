//! Day-of-week sets.

use std::fmt;

use chrono::Weekday;

/// A set of weekdays a time range applies to.
///
/// Bit `n` is set when `Weekday::num_days_from_monday() == n`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayMask(u8);

const ALL_BITS: u8 = 0b111_1111;

impl DayMask {
    /// Every day of the week. Used when a range has no day prefix.
    pub const ALL: DayMask = DayMask(ALL_BITS);

    /// Monday to Friday.
    pub const WEEKDAYS: DayMask = DayMask(0b001_1111);

    /// Saturday and Sunday.
    pub const WEEKEND: DayMask = DayMask(0b110_0000);

    /// The empty set.
    pub const NONE: DayMask = DayMask(0);

    /// A mask holding a single day.
    pub fn single(day: Weekday) -> Self {
        DayMask(1 << day.num_days_from_monday())
    }

    /// Build a mask from any collection of days.
    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter()
            .fold(DayMask::NONE, |mask, day| mask.union(DayMask::single(day)))
    }

    /// Parse a day prefix. Case-insensitive; accepts short and long names,
    /// plurals, `weekday`/`weekend` and `daily`. An empty prefix means daily.
    pub fn parse(s: &str) -> Option<Self> {
        let mask = match s.trim().to_ascii_lowercase().as_str() {
            "mon" | "monday" | "mondays" => DayMask::single(Weekday::Mon),
            "tue" | "tues" | "tuesday" | "tuesdays" => DayMask::single(Weekday::Tue),
            "wed" | "weds" | "wednesday" | "wednesdays" => DayMask::single(Weekday::Wed),
            "thu" | "thurs" | "thursday" | "thursdays" => DayMask::single(Weekday::Thu),
            "fri" | "friday" | "fridays" => DayMask::single(Weekday::Fri),
            "sat" | "saturday" | "saturdays" => DayMask::single(Weekday::Sat),
            "sun" | "sunday" | "sundays" => DayMask::single(Weekday::Sun),
            "weekday" | "weekdays" | "week" => DayMask::WEEKDAYS,
            "weekend" | "weekends" => DayMask::WEEKEND,
            "" | "daily" | "all" | "every" | "everyday" => DayMask::ALL,
            _ => return None,
        };
        Some(mask)
    }

    /// Returns true if `day` is in the set.
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & DayMask::single(day).0 != 0
    }

    /// Set union.
    pub fn union(self, other: DayMask) -> Self {
        DayMask(self.0 | other.0)
    }

    /// Returns true if no day is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the days in the set, Monday first.
    pub fn days(self) -> impl Iterator<Item = Weekday> {
        let mut day = Weekday::Mon;
        (0..7).filter_map(move |_| {
            let current = day;
            day = day.succ();
            self.contains(current).then_some(current)
        })
    }

    /// The shortest prefix that parses back to this mask, if one exists.
    ///
    /// Returns `Some("")` for the full week, which is written without a prefix.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            DayMask::ALL => Some(""),
            DayMask::WEEKDAYS => Some("weekday"),
            DayMask::WEEKEND => Some("weekend"),
            _ => {
                let mut days = self.days();
                match (days.next(), days.next()) {
                    (Some(day), None) => Some(short_name(day)),
                    _ => None,
                }
            }
        }
    }
}

fn short_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

impl fmt::Debug for DayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.days()).finish()
    }
}

impl fmt::Display for DayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix() {
            Some("") => f.write_str("daily"),
            Some(name) => f.write_str(name),
            None => {
                let names: Vec<_> = self.days().map(short_name).collect();
                f.write_str(&names.join("+"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_shorthands() {
        assert_eq!(DayMask::parse("weekday"), Some(DayMask::WEEKDAYS));
        assert_eq!(DayMask::parse("WEEKEND"), Some(DayMask::WEEKEND));
        assert_eq!(DayMask::parse("Daily"), Some(DayMask::ALL));
        assert_eq!(DayMask::parse("fri"), Some(DayMask::single(Weekday::Fri)));
        assert_eq!(DayMask::parse("Tues"), Some(DayMask::single(Weekday::Tue)));
        assert_eq!(DayMask::parse("sundays"), Some(DayMask::single(Weekday::Sun)));
    }

    #[test]
    fn empty_prefix_is_daily() {
        assert_eq!(DayMask::parse(""), Some(DayMask::ALL));
        assert_eq!(DayMask::parse("  "), Some(DayMask::ALL));
    }

    #[test]
    fn unknown_day_rejected() {
        assert_eq!(DayMask::parse("funday"), None);
        assert_eq!(DayMask::parse("fr"), None);
    }

    #[test]
    fn weekday_and_weekend_partition_the_week() {
        for day in DayMask::ALL.days() {
            assert_ne!(
                DayMask::WEEKDAYS.contains(day),
                DayMask::WEEKEND.contains(day)
            );
        }
        assert_eq!(DayMask::WEEKDAYS.union(DayMask::WEEKEND), DayMask::ALL);
    }

    #[test]
    fn days_iterates_monday_first() {
        let days: Vec<_> = DayMask::WEEKEND.days().collect();
        assert_eq!(days, vec![Weekday::Sat, Weekday::Sun]);
        assert_eq!(DayMask::ALL.days().count(), 7);
        assert_eq!(DayMask::NONE.days().count(), 0);
    }

    #[test]
    fn from_days_builds_union() {
        let mask = DayMask::from_days([Weekday::Sat, Weekday::Sun]);
        assert_eq!(mask, DayMask::WEEKEND);
    }

    #[test]
    fn prefix_only_for_parseable_masks() {
        assert_eq!(DayMask::ALL.prefix(), Some(""));
        assert_eq!(DayMask::WEEKDAYS.prefix(), Some("weekday"));
        assert_eq!(DayMask::single(Weekday::Wed).prefix(), Some("wed"));
        assert_eq!(
            DayMask::from_days([Weekday::Mon, Weekday::Wed]).prefix(),
            None
        );
    }

    #[test]
    fn display() {
        assert_eq!(DayMask::ALL.to_string(), "daily");
        assert_eq!(
            DayMask::from_days([Weekday::Mon, Weekday::Wed]).to_string(),
            "mon+wed"
        );
    }
}
