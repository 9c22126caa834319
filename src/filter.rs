// Filter Engine: a conjunction of user-selected predicates applied as a
// single stable pass over the record store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::store::{ListingRecord, RecordStore};

/// A multiselect control's value: everything, or an explicit set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::All
    }
}

/// One user interaction's worth of filter state. All conditions are ANDed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub brands: Selection,
    #[serde(default)]
    pub platforms: Selection,
    #[serde(default = "default_cities")]
    pub cities: Selection,
    #[serde(default)]
    pub min_price: f64,
    #[serde(default = "default_max_price")]
    pub max_price: f64,
}

fn default_cities() -> Selection {
    Selection::only(["Bhopal"])
}

fn default_max_price() -> f64 {
    f64::MAX
}

impl Default for FilterCriteria {
    fn default() -> Self {
        FilterCriteria {
            brands: Selection::All,
            platforms: Selection::All,
            cities: default_cities(),
            min_price: 0.0,
            max_price: f64::MAX,
        }
    }
}

impl FilterCriteria {
    /// Criteria matching every record (no city restriction).
    pub fn unrestricted() -> Self {
        FilterCriteria {
            cities: Selection::All,
            ..FilterCriteria::default()
        }
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        if self.min_price.is_nan() || self.max_price.is_nan() || self.min_price > self.max_price {
            return Err(CriteriaError::InvalidPriceRange {
                min: self.min_price,
                max: self.max_price,
            });
        }
        Ok(())
    }

    pub fn matches(&self, record: &ListingRecord) -> bool {
        self.brands.matches(&record.brand)
            && self.platforms.matches(&record.platform)
            && self.cities.matches(&record.city)
            && record.price >= self.min_price
            && record.price <= self.max_price
    }
}

/// Invalid request, as distinct from a valid request with no matches.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaError {
    InvalidPriceRange { min: f64, max: f64 },
}

impl std::fmt::Display for CriteriaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CriteriaError::InvalidPriceRange { min, max } => {
                write!(f, "invalid price range: min {} > max {}", min, max)
            }
        }
    }
}

impl std::error::Error for CriteriaError {}

/// Apply the criteria to the store. Output preserves store order; an
/// empty result is Ok (the "no data" state), never an error.
pub fn filter(
    store: &RecordStore,
    criteria: &FilterCriteria,
) -> Result<Vec<ListingRecord>, CriteriaError> {
    criteria.validate()?;

    Ok(store
        .records()
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(platform: &str, brand: &str, price: f64, city: &str) -> ListingRecord {
        ListingRecord {
            platform: platform.to_string(),
            brand: brand.to_string(),
            model: "Test Model".to_string(),
            price,
            city: city.to_string(),
            rating: 4.0,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            record("Amazon", "Dell", 50000.0, "Bhopal"),
            record("Flipkart", "Dell", 48000.0, "Bhopal"),
            record("Amazon", "HP", 60000.0, "Mumbai"),
            record("Reliance Digital", "Lenovo", 55000.0, "Bhopal"),
        ])
    }

    #[test]
    fn test_all_predicates_hold_on_output() {
        let criteria = FilterCriteria {
            brands: Selection::only(["Dell"]),
            platforms: Selection::All,
            cities: Selection::only(["Bhopal"]),
            min_price: 0.0,
            max_price: 49000.0,
        };

        let result = filter(&store(), &criteria).unwrap();
        assert_eq!(result.len(), 1);
        for r in &result {
            assert!(criteria.matches(r));
        }
        assert_eq!(result[0].platform, "Flipkart");
    }

    #[test]
    fn test_filter_preserves_store_order() {
        let criteria = FilterCriteria {
            cities: Selection::only(["Bhopal"]),
            ..FilterCriteria::unrestricted()
        };

        let result = filter(&store(), &criteria).unwrap();
        let platforms: Vec<&str> = result.iter().map(|r| r.platform.as_str()).collect();
        assert_eq!(platforms, vec!["Amazon", "Flipkart", "Reliance Digital"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let criteria = FilterCriteria {
            brands: Selection::only(["Dell", "HP"]),
            max_price: 60000.0,
            ..FilterCriteria::unrestricted()
        };

        let once = filter(&store(), &criteria).unwrap();
        let twice = filter(&RecordStore::from_records(once.clone()), &criteria).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let criteria = FilterCriteria {
            min_price: 48000.0,
            max_price: 50000.0,
            ..FilterCriteria::unrestricted()
        };

        let result = filter(&store(), &criteria).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_empty_result_is_ok_not_error() {
        let criteria = FilterCriteria {
            min_price: 0.0,
            max_price: 1.0,
            ..FilterCriteria::unrestricted()
        };

        let result = filter(&store(), &criteria).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_inverted_price_range_is_invalid() {
        let criteria = FilterCriteria {
            min_price: 60000.0,
            max_price: 40000.0,
            ..FilterCriteria::unrestricted()
        };

        let err = filter(&store(), &criteria).unwrap_err();
        assert_eq!(
            err,
            CriteriaError::InvalidPriceRange {
                min: 60000.0,
                max: 40000.0
            }
        );
    }

    #[test]
    fn test_nan_bound_is_invalid() {
        let criteria = FilterCriteria {
            min_price: f64::NAN,
            ..FilterCriteria::unrestricted()
        };
        assert!(filter(&store(), &criteria).is_err());
    }

    #[test]
    fn test_default_city_is_bhopal() {
        let result = filter(&store(), &FilterCriteria::default()).unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|r| r.city == "Bhopal"));
    }
}
