use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::quality::{self, RejectedRow};

/// A single price observation: one laptop listing on one platform,
/// in one city, on one date. Validated at the load boundary and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub platform: String,
    pub brand: String,
    pub model: String,
    /// Price in Indian Rupees. Always finite and > 0.
    pub price: f64,
    pub city: String,
    /// Customer rating in [1.0, 5.0].
    pub rating: f64,
    pub date: NaiveDate,
}

/// Raw CSV row before validation. Price, rating and date arrive as text
/// (the source data carries currency symbols and thousands separators).
#[derive(Debug, Clone, Deserialize)]
pub struct RawListing {
    pub platform: String,
    pub brand: String,
    pub model: String,
    pub price: String,
    pub city: String,
    pub rating: String,
    pub date: String,
}

/// Immutable, ordered record set. Built once at startup, then shared
/// read-only by the filter engine, aggregator and recommender.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<ListingRecord>,
}

impl RecordStore {
    pub fn from_records(records: Vec<ListingRecord>) -> Self {
        RecordStore { records }
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct platform names, sorted. Used to populate filter controls.
    pub fn platforms(&self) -> Vec<String> {
        self.distinct(|r| &r.platform)
    }

    /// Distinct brand names, sorted.
    pub fn brands(&self) -> Vec<String> {
        self.distinct(|r| &r.brand)
    }

    /// Distinct city names, sorted.
    pub fn cities(&self) -> Vec<String> {
        self.distinct(|r| &r.city)
    }

    /// Full price span of the dataset, for price-range controls.
    /// None when the store is empty.
    pub fn price_span(&self) -> Option<(f64, f64)> {
        let mut iter = self.records.iter().map(|r| r.price);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some((min, max))
    }

    fn distinct<F>(&self, key: F) -> Vec<String>
    where
        F: Fn(&ListingRecord) -> &String,
    {
        let set: BTreeSet<&String> = self.records.iter().map(key).collect();
        set.into_iter().cloned().collect()
    }
}

/// Result of loading a CSV file: the validated store plus every row
/// that was dropped, with the reason it failed.
#[derive(Debug)]
pub struct LoadReport {
    pub store: RecordStore,
    pub rejected: Vec<RejectedRow>,
}

/// Load listings from CSV, validating each row at the boundary.
/// Rows that fail validation are dropped and reported, never repaired
/// (except currency formatting in the price column, which is stripped).
pub fn load_csv(csv_path: &Path) -> Result<LoadReport> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open CSV file")?;

    let mut records = Vec::new();
    let mut rejected = Vec::new();

    // Line 1 is the header row.
    for (idx, result) in rdr.deserialize().enumerate() {
        let line = idx as u64 + 2;
        let raw: RawListing = result.context("Failed to deserialize listing row")?;

        match quality::validate_row(line, &raw) {
            Ok(record) => records.push(record),
            Err(reason) => rejected.push(reason),
        }
    }

    Ok(LoadReport {
        store: RecordStore::from_records(records),
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn raw(price: &str, rating: &str, date: &str) -> RawListing {
        RawListing {
            platform: "Amazon".to_string(),
            brand: "Dell".to_string(),
            model: "Inspiron 15".to_string(),
            price: price.to_string(),
            city: "Bhopal".to_string(),
            rating: rating.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_distinct_values_sorted() {
        let store = RecordStore::from_records(vec![
            record("Flipkart", "HP", 50000.0, "Mumbai"),
            record("Amazon", "Dell", 48000.0, "Bhopal"),
            record("Amazon", "HP", 60000.0, "Bhopal"),
        ]);

        assert_eq!(store.platforms(), vec!["Amazon", "Flipkart"]);
        assert_eq!(store.brands(), vec!["Dell", "HP"]);
        assert_eq!(store.cities(), vec!["Bhopal", "Mumbai"]);
    }

    #[test]
    fn test_price_span() {
        let store = RecordStore::from_records(vec![
            record("Amazon", "Dell", 48000.0, "Bhopal"),
            record("Amazon", "HP", 60000.0, "Bhopal"),
        ]);
        assert_eq!(store.price_span(), Some((48000.0, 60000.0)));
        assert_eq!(RecordStore::default().price_span(), None);
    }

    #[test]
    fn test_load_csv_rejects_bad_rows() {
        let mut file = tempfile_csv(
            "platform,brand,model,price,city,rating,date\n\
             Amazon,Dell,Inspiron 15,\"₹50,000\",Bhopal,4.2,2024-01-01\n\
             Flipkart,HP,Pavilion,-100,Mumbai,4.0,2024-01-02\n\
             Amazon,Lenovo,ThinkPad,62000,Bhopal,9.9,2024-01-03\n",
        );
        file.flush().unwrap();

        let report = load_csv(file.path()).unwrap();
        assert_eq!(report.store.len(), 1);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.store.records()[0].price, 50000.0);
        // Rejected rows carry their source line numbers
        assert_eq!(report.rejected[0].line, 3);
        assert_eq!(report.rejected[1].line, 4);
    }

    #[test]
    fn test_raw_row_order_preserved() {
        let rows = vec![
            raw("50000", "4.2", "2024-01-01"),
            raw("48000", "4.0", "2024-01-02"),
        ];
        let records: Vec<ListingRecord> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| quality::validate_row(i as u64 + 2, r).unwrap())
            .collect();
        assert_eq!(records[0].price, 50000.0);
        assert_eq!(records[1].price, 48000.0);
    }

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

    fn tempfile_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }
}
