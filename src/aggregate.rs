// Aggregator: grouped mean/min/count views over the filtered record set.
// Recomputed from scratch on every filter change; nothing is cached.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::store::ListingRecord;

/// Summary statistics for one group of records. Only emitted for groups
/// with at least one record, so `mean_price` is never NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub key: String,
    pub mean_price: f64,
    pub min_price: f64,
    pub count: usize,
}

/// Per-brand view: the distribution chart needs every price, not just
/// the summary stats.
#[derive(Debug, Clone, Serialize)]
pub struct BrandPrices {
    pub brand: String,
    pub prices: Vec<f64>,
    pub summary: PriceSummary,
}

/// Headline metrics across the whole filtered view. None means no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub count: usize,
    pub mean_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    min: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, price: f64) {
        if self.count == 0 || price < self.min {
            self.min = price;
        }
        self.sum += price;
        self.count += 1;
    }

    fn summary(&self, key: String) -> PriceSummary {
        PriceSummary {
            key,
            mean_price: self.sum / self.count as f64,
            min_price: self.min,
            count: self.count,
        }
    }
}

/// Group by platform. Output order is unspecified; consumers sort for
/// display (the recommender imposes its own order).
pub fn by_platform(records: &[ListingRecord]) -> Vec<PriceSummary> {
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();
    for r in records {
        groups.entry(&r.platform).or_default().add(r.price);
    }
    groups
        .into_iter()
        .map(|(key, acc)| acc.summary(key.to_string()))
        .collect()
}

/// Group by brand, keeping the full per-record price list per brand in
/// record order.
pub fn by_brand(records: &[ListingRecord]) -> Vec<BrandPrices> {
    let mut prices: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in records {
        prices.entry(&r.brand).or_default().push(r.price);
    }
    prices
        .into_iter()
        .map(|(brand, prices)| {
            let mut acc = Accumulator::default();
            for p in &prices {
                acc.add(*p);
            }
            BrandPrices {
                brand: brand.to_string(),
                summary: acc.summary(brand.to_string()),
                prices,
            }
        })
        .collect()
}

/// Group by calendar date, strictly ascending. Keys are ISO dates.
pub fn by_date(records: &[ListingRecord]) -> Vec<PriceSummary> {
    let mut groups: BTreeMap<chrono::NaiveDate, Accumulator> = BTreeMap::new();
    for r in records {
        groups.entry(r.date).or_default().add(r.price);
    }
    groups
        .into_iter()
        .map(|(date, acc)| acc.summary(date.to_string()))
        .collect()
}

/// Headline metrics for the filtered view, or None when it is empty.
pub fn overview(records: &[ListingRecord]) -> Option<Overview> {
    let mut iter = records.iter().map(|r| r.price);
    let first = iter.next()?;
    let (sum, min, max) = iter.fold((first, first, first), |(sum, min, max), p| {
        (sum + p, min.min(p), max.max(p))
    });
    Some(Overview {
        count: records.len(),
        mean_price: sum / records.len() as f64,
        min_price: min,
        max_price: max,
    })
}
