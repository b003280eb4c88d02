//! Per-service annotations: slowness and visibility.

use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};

use crate::domain::{Crs, Departure, InvalidCrs};

use super::PenaltyTable;

/// Grades services by the slowest station they call at.
#[derive(Debug, Clone, Default)]
pub struct ServiceClassifier {
    table: PenaltyTable,
}

impl ServiceClassifier {
    /// Create a classifier over a penalty table.
    pub fn new(table: PenaltyTable) -> Self {
        Self { table }
    }

    /// The table this classifier reads.
    pub fn table(&self) -> &PenaltyTable {
        &self.table
    }

    /// Highest penalty among the calling points, or 0 if none is listed.
    ///
    /// Penalties are the worst single reason a service is slow, so they are
    /// not summed.
    pub fn classify(&self, calling_points: &[Crs]) -> u8 {
        calling_points
            .iter()
            .filter_map(|crs| self.table.get(crs))
            .map(|penalty| penalty.value())
            .max()
            .unwrap_or(0)
    }
}

/// Shows only services calling at one of a set of stations.
///
/// An empty set shows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallingFilter {
    required: HashSet<Crs>,
}

impl CallingFilter {
    /// Create a filter from the stations a service must call at (any of).
    pub fn new(required: impl IntoIterator<Item = Crs>) -> Self {
        Self {
            required: required.into_iter().collect(),
        }
    }

    /// Parse a comma-separated station list, reporting every bad code.
    pub fn parse(text: &str) -> Result<Self, Vec<InvalidCrs>> {
        let (codes, errors): (Vec<_>, Vec<_>) = text
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Crs::parse_config)
            .partition(Result::is_ok);

        if errors.is_empty() {
            Ok(Self::new(codes.into_iter().flatten()))
        } else {
            Err(errors.into_iter().filter_map(Result::err).collect())
        }
    }

    /// Stations a service must call at (any of).
    pub fn required(&self) -> &HashSet<Crs> {
        &self.required
    }

    /// Returns true if the service should be shown.
    pub fn should_show(&self, calling_points: &[Crs]) -> bool {
        self.required.is_empty() || calling_points.iter().any(|crs| self.required.contains(crs))
    }
}

/// Every rule deciding whether a departure is shown.
#[derive(Debug, Clone)]
pub struct DepartureFilter {
    /// Stations the service must call at (any of).
    pub calling: CallingFilter,

    /// Platform the service must leave from, compared case-insensitively.
    pub platform: Option<String>,

    /// Services leaving sooner than this are hidden.
    pub min_departure: Duration,
}

impl Default for DepartureFilter {
    fn default() -> Self {
        Self {
            calling: CallingFilter::default(),
            platform: None,
            min_departure: Duration::zero(),
        }
    }
}

impl DepartureFilter {
    /// Returns true if the departure should be shown at `now`.
    pub fn should_show(&self, departure: &Departure, now: NaiveDateTime) -> bool {
        if !self.calling.should_show(&departure.calling_points) {
            return false;
        }

        if let Some(platform) = &self.platform {
            let on_platform = departure
                .platform
                .as_deref()
                .is_some_and(|p| p.trim().eq_ignore_ascii_case(platform.trim()));
            if !on_platform {
                return false;
            }
        }

        departure.time_until(now) >= self.min_departure
    }
}

/// A departure with its board annotations.
#[derive(Debug, Clone)]
pub struct Annotated {
    /// The service.
    pub departure: Departure,
    /// Slowness penalty, 0 when not slow.
    pub penalty: u8,
    /// Whether the service passes the filters.
    pub visible: bool,
}

impl Annotated {
    /// Returns true if the service is marked slow.
    pub fn is_slow(&self) -> bool {
        self.penalty > 0
    }
}

/// Applies the classifier and filters to a whole board.
#[derive(Debug, Clone, Default)]
pub struct ServiceAnnotator {
    classifier: ServiceClassifier,
    filter: DepartureFilter,
}

impl ServiceAnnotator {
    /// Create an annotator.
    pub fn new(classifier: ServiceClassifier, filter: DepartureFilter) -> Self {
        Self { classifier, filter }
    }

    /// Annotate one departure.
    pub fn annotate(&self, departure: &Departure, now: NaiveDateTime) -> Annotated {
        Annotated {
            penalty: self.classifier.classify(&departure.calling_points),
            visible: self.filter.should_show(departure, now),
            departure: departure.clone(),
        }
    }

    /// Annotate a board, keeping board order.
    pub fn annotate_all(&self, departures: &[Departure], now: NaiveDateTime) -> Vec<Annotated> {
        departures
            .iter()
            .map(|departure| self.annotate(departure, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    fn route(codes: &[&str]) -> Vec<Crs> {
        codes.iter().map(|c| crs(c)).collect()
    }

    fn at(hhmm: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_time(NaiveTime::parse_from_str(hhmm, "%H:%M").unwrap())
    }

    fn departure(id: &str, leaves: &str, platform: Option<&str>, calls: &[&str]) -> Departure {
        Departure {
            service_id: id.to_string(),
            scheduled_departure: NaiveTime::parse_from_str(leaves, "%H:%M").unwrap(),
            expected_departure: None,
            destination: "Edinburgh".to_string(),
            platform: platform.map(str::to_string),
            status: "ON TIME".to_string(),
            calling_points: route(calls),
        }
    }

    fn classifier(text: &str) -> ServiceClassifier {
        ServiceClassifier::new(PenaltyTable::parse(text).unwrap())
    }

    #[test]
    fn classify_takes_highest_penalty() {
        let c = classifier("SVG=2,PBO=1");
        assert_eq!(c.classify(&route(&["KGX", "PBO", "EDB"])), 1);
        assert_eq!(c.classify(&route(&["KGX", "SVG", "PBO"])), 2);
        assert_eq!(c.classify(&route(&["KGX", "EDB"])), 0);
    }

    #[test]
    fn classify_is_not_a_sum() {
        let c = classifier("SVG=2,PBO=2,HIT=2");
        assert_eq!(c.classify(&route(&["SVG", "PBO", "HIT"])), 2);
    }

    #[test]
    fn classify_legacy_table() {
        let c = classifier("SVG,PBO");
        assert_eq!(c.classify(&route(&["SVG", "PBO"])), 1);
        assert_eq!(c.classify(&route(&["EDB"])), 0);
    }

    #[test]
    fn classify_empty_inputs() {
        assert_eq!(ServiceClassifier::default().classify(&route(&["SVG"])), 0);
        assert_eq!(classifier("SVG=9").classify(&[]), 0);
    }

    #[test]
    fn calling_filter_empty_shows_all() {
        let filter = CallingFilter::default();
        assert!(filter.should_show(&route(&["KGX", "PBO", "EDB"])));
        assert!(filter.should_show(&[]));
    }

    #[test]
    fn calling_filter_requires_any_station() {
        let filter = CallingFilter::new([crs("BFR")]);
        assert!(filter.should_show(&route(&["KGX", "BFR", "EDB"])));
        assert!(!filter.should_show(&route(&["KGX", "PBO", "EDB"])));
        assert!(!filter.should_show(&[]));

        let either = CallingFilter::new([crs("BFR"), crs("PBO")]);
        assert!(either.should_show(&route(&["KGX", "PBO", "EDB"])));
    }

    #[test]
    fn calling_filter_parse() {
        let filter = CallingFilter::parse("bfr, PBO,").unwrap();
        assert_eq!(filter, CallingFilter::new([crs("BFR"), crs("PBO")]));
        assert!(CallingFilter::parse("").unwrap().required().is_empty());

        let errors = CallingFilter::parse("BFR,BLACKFRIARS,X").unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn platform_filter() {
        let filter = DepartureFilter {
            platform: Some("4a".to_string()),
            ..Default::default()
        };
        let now = at("09:00");
        assert!(filter.should_show(&departure("A", "10:00", Some("4A"), &[]), now));
        assert!(!filter.should_show(&departure("B", "10:00", Some("5"), &[]), now));
        assert!(!filter.should_show(&departure("C", "10:00", None, &[]), now));
    }

    #[test]
    fn min_departure_filter() {
        let filter = DepartureFilter {
            min_departure: Duration::minutes(5),
            ..Default::default()
        };
        let now = at("09:57");
        assert!(!filter.should_show(&departure("A", "10:00", None, &[]), now));
        assert!(filter.should_show(&departure("B", "10:02", None, &[]), now));
    }

    #[test]
    fn default_filter_hides_departed_services() {
        let filter = DepartureFilter::default();
        assert!(filter.should_show(&departure("A", "10:00", None, &[]), at("10:00")));
        assert!(!filter.should_show(&departure("A", "10:00", None, &[]), at("10:01")));
    }

    #[test]
    fn annotate_board() {
        let annotator = ServiceAnnotator::new(
            classifier("SVG=2,PBO=1"),
            DepartureFilter {
                calling: CallingFilter::new([crs("EDB")]),
                ..Default::default()
            },
        );
        let board = vec![
            departure("fast", "10:00", None, &["YRK", "EDB"]),
            departure("slow", "10:05", None, &["SVG", "PBO", "EDB"]),
            departure("local", "10:10", None, &["SVG", "CBG"]),
        ];

        let annotated = annotator.annotate_all(&board, at("09:00"));
        let summary: Vec<_> = annotated
            .iter()
            .map(|a| (a.departure.service_id.as_str(), a.penalty, a.visible))
            .collect();
        assert_eq!(
            summary,
            vec![("fast", 0, true), ("slow", 2, true), ("local", 2, false)]
        );
        assert!(!annotated[0].is_slow());
        assert!(annotated[1].is_slow());
    }
}
