use chrono::{Duration, NaiveDate};
use entities::locations::Location;
use itertools::Itertools;

const RECENT_DAYS: i64 = 30;

/// Aggregates shown on the dashboard header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JourneyStats {
    pub locations: usize,
    pub photos: usize,
    pub locations_with_photos: usize,
    pub countries: usize,
    /// Visits in the 30 days up to and including `today`.
    pub recent_visits: usize,
    pub latest_place: Option<String>,
    pub last_visit: Option<NaiveDate>,
}

impl JourneyStats {
    /// `locations` is expected in store order, most recent visit first.
    pub fn compute(locations: &[Location], today: NaiveDate) -> Self {
        let since = today - Duration::days(RECENT_DAYS);
        let latest = locations.first();

        JourneyStats {
            locations: locations.len(),
            photos: locations.iter().map(|l| l.photo_urls.len()).sum(),
            locations_with_photos: locations
                .iter()
                .filter(|l| !l.photo_urls.is_empty())
                .count(),
            countries: locations
                .iter()
                .map(|l| l.name.country())
                .unique()
                .count(),
            recent_visits: locations
                .iter()
                .filter_map(|l| l.visited_date)
                .filter(|date| *date >= since && *date <= today)
                .count(),
            latest_place: latest.map(|l| l.name.short_name().to_owned()),
            last_visit: latest.and_then(|l| l.visited_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::JourneyStats;
    use crate::test_support::location;
    use chrono::NaiveDate;
    use entities::locations::{Category, OwnerId, PhotoUrl};

    #[test]
    fn test_stats_over_a_sorted_snapshot() {
        let owner = OwnerId::new();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut paris = location(
            owner,
            "Paris, Île-de-France, France",
            Category::Food,
            NaiveDate::from_ymd_opt(2024, 2, 20),
        );
        paris.photo_urls = vec![PhotoUrl::from("a"), PhotoUrl::from("b")];
        let nice = location(
            owner,
            "Nice, France",
            Category::Beach,
            NaiveDate::from_ymd_opt(2023, 8, 1),
        );
        let mut tokyo = location(owner, "Tokyo, Japan", Category::Urban, None);
        tokyo.photo_urls = vec![PhotoUrl::from("c")];

        let stats = JourneyStats::compute(&[paris, nice, tokyo], today);

        assert_eq!(
            stats,
            JourneyStats {
                locations: 3,
                photos: 3,
                locations_with_photos: 2,
                countries: 2,
                recent_visits: 1,
                latest_place: Some("Paris".to_string()),
                last_visit: NaiveDate::from_ymd_opt(2024, 2, 20),
            }
        );
    }

    #[test]
    fn test_countries_compare_the_trimmed_segment_exactly() {
        let owner = OwnerId::new();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let locations = [
            location(owner, "Lyon,France", Category::Food, None),
            location(owner, "Nice,  France ", Category::Beach, None),
            location(owner, "Paris, france", Category::Urban, None),
        ];

        let stats = JourneyStats::compute(&locations, today);

        assert_eq!(stats.countries, 2);
    }

    #[test]
    fn test_empty_snapshot() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(JourneyStats::compute(&[], today), JourneyStats::default());
    }
}
