// Load-boundary validation for raw CSV rows.
// A row either passes every check and enters the store, or is dropped
// with a reason. The core pipeline never re-validates.

use chrono::NaiveDate;
use serde::Serialize;

use crate::store::{ListingRecord, RawListing};

/// A dropped source row: which line, which field failed, and why.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub field: String,
    pub reason: String,
}

impl RejectedRow {
    fn new(line: u64, field: &str, reason: impl Into<String>) -> Self {
        RejectedRow {
            line,
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for RejectedRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.field, self.reason)
    }
}

/// Validate one raw row into a `ListingRecord`.
/// Checks: non-empty text fields, finite positive price (after stripping
/// currency formatting), rating in [1.0, 5.0], valid YYYY-MM-DD date.
pub fn validate_row(line: u64, raw: &RawListing) -> Result<ListingRecord, RejectedRow> {
    let text_fields = [
        ("platform", &raw.platform),
        ("brand", &raw.brand),
        ("model", &raw.model),
        ("city", &raw.city),
    ];
    for (name, value) in text_fields {
        if value.trim().is_empty() {
            return Err(RejectedRow::new(line, name, "required field is empty"));
        }
    }

    let price = clean_price(&raw.price)
        .ok_or_else(|| RejectedRow::new(line, "price", format!("not numeric: {:?}", raw.price)))?;
    if !price.is_finite() || price <= 0.0 {
        return Err(RejectedRow::new(
            line,
            "price",
            format!("must be positive and finite, got {}", price),
        ));
    }

    let rating: f64 = raw
        .rating
        .trim()
        .parse()
        .map_err(|_| RejectedRow::new(line, "rating", format!("not numeric: {:?}", raw.rating)))?;
    if !(1.0..=5.0).contains(&rating) {
        return Err(RejectedRow::new(
            line,
            "rating",
            format!("out of range [1.0, 5.0]: {}", rating),
        ));
    }

    let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d")
        .map_err(|_| RejectedRow::new(line, "date", format!("invalid date: {:?}", raw.date)))?;

    Ok(ListingRecord {
        platform: raw.platform.trim().to_string(),
        brand: raw.brand.trim().to_string(),
        model: raw.model.trim().to_string(),
        price,
        city: raw.city.trim().to_string(),
        rating,
        date,
    })
}

/// Strip rupee signs, thousands separators and whitespace from a price
/// cell, then parse. The source dataset formats prices as e.g. "₹50,000".
fn clean_price(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '₹' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row() -> RawListing {
        RawListing {
            platform: "Amazon".to_string(),
            brand: "Dell".to_string(),
            model: "Inspiron 15".to_string(),
            price: "₹50,000".to_string(),
            city: "Bhopal".to_string(),
            rating: "4.2".to_string(),
            date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn test_valid_row_passes() {
        let record = validate_row(2, &raw_row()).unwrap();
        assert_eq!(record.platform, "Amazon");
        assert_eq!(record.price, 50000.0);
        assert_eq!(record.rating, 4.2);
        assert_eq!(record.date.to_string(), "2024-01-01");
    }

    #[test]
    fn test_currency_formatting_is_stripped() {
        assert_eq!(clean_price("₹1,23,456"), Some(123456.0));
        assert_eq!(clean_price("48000"), Some(48000.0));
        assert_eq!(clean_price("48000.50"), Some(48000.5));
        assert_eq!(clean_price("N/A"), None);
        assert_eq!(clean_price(""), None);
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut row = raw_row();
        row.price = "0".to_string();
        let err = validate_row(3, &row).unwrap_err();
        assert_eq!(err.field, "price");
        assert_eq!(err.line, 3);

        row.price = "-500".to_string();
        assert!(validate_row(3, &row).is_err());
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let mut row = raw_row();
        row.rating = "0.5".to_string();
        assert_eq!(validate_row(2, &row).unwrap_err().field, "rating");

        row.rating = "5.1".to_string();
        assert_eq!(validate_row(2, &row).unwrap_err().field, "rating");

        row.rating = "5.0".to_string();
        assert!(validate_row(2, &row).is_ok());
    }

    #[test]
    fn test_bad_date_rejected() {
        let mut row = raw_row();
        row.date = "01/15/2024".to_string();
        assert_eq!(validate_row(2, &row).unwrap_err().field, "date");

        row.date = "2024-02-30".to_string();
        assert_eq!(validate_row(2, &row).unwrap_err().field, "date");
    }

    #[test]
    fn test_empty_text_field_rejected() {
        let mut row = raw_row();
        row.brand = "   ".to_string();
        let err = validate_row(2, &row).unwrap_err();
        assert_eq!(err.field, "brand");
    }
}
