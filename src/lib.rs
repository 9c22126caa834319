// Laptop Scout - Core Library
// Filter → aggregate → recommend pipeline over an immutable listing dataset.
// Exposed for use by the CLI dashboard, the API server, and tests.

pub mod aggregate;
pub mod filter;
pub mod quality;
pub mod recommend;
pub mod store;

// Re-export commonly used types
pub use aggregate::{by_brand, by_date, by_platform, overview, BrandPrices, Overview, PriceSummary};
pub use filter::{filter, CriteriaError, FilterCriteria, Selection};
pub use quality::RejectedRow;
pub use recommend::{recommend, Recommendation};
pub use store::{load_csv, ListingRecord, LoadReport, RawListing, RecordStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(platform: &str, brand: &str, price: f64, city: &str, date: &str) -> ListingRecord {
        ListingRecord {
            platform: platform.to_string(),
            brand: brand.to_string(),
            model: "Test Model".to_string(),
            price,
            city: city.to_string(),
            rating: 4.2,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        }
    }

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            record("Amazon", "Dell", 50000.0, "Bhopal", "2024-01-01"),
            record("Flipkart", "Dell", 48000.0, "Bhopal", "2024-01-02"),
            record("Amazon", "HP", 60000.0, "Mumbai", "2024-01-03"),
        ])
    }

    #[test]
    fn test_bhopal_scenario_end_to_end() {
        let criteria = FilterCriteria {
            cities: Selection::only(["Bhopal"]),
            min_price: 0.0,
            max_price: 100000.0,
            ..FilterCriteria::unrestricted()
        };

        let filtered = filter(&store(), &criteria).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].platform, "Amazon");
        assert_eq!(filtered[1].platform, "Flipkart");

        let mut platforms = by_platform(&filtered);
        platforms.sort_by(|a, b| a.key.cmp(&b.key));
        assert_eq!(platforms.len(), 2);
        assert_eq!(platforms[0].key, "Amazon");
        assert_eq!(platforms[0].mean_price, 50000.0);
        assert_eq!(platforms[0].min_price, 50000.0);
        assert_eq!(platforms[0].count, 1);
        assert_eq!(platforms[1].key, "Flipkart");
        assert_eq!(platforms[1].mean_price, 48000.0);

        let picks = recommend(&platforms);
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0].platform, "Flipkart");
        assert_eq!(picks[0].mean_price, 48000.0);
        assert_eq!(picks[1].platform, "Amazon");
        assert_eq!(picks[1].mean_price, 50000.0);
    }

    #[test]
    fn test_excluding_everything_yields_empty_everywhere() {
        let criteria = FilterCriteria {
            min_price: 0.0,
            max_price: 1.0,
            ..FilterCriteria::unrestricted()
        };

        let filtered = filter(&store(), &criteria).unwrap();
        assert!(filtered.is_empty());
        assert!(by_platform(&filtered).is_empty());
        assert!(by_brand(&filtered).is_empty());
        assert!(by_date(&filtered).is_empty());
        assert_eq!(overview(&filtered), None);
        assert!(recommend(&by_platform(&filtered)).is_empty());
    }
}
