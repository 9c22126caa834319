// Recommender: the two cheapest platforms by mean price over the current
// filtered view. Pure function, no state between invocations.

use serde::Serialize;

use crate::aggregate::PriceSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub platform: String,
    pub mean_price: f64,
    pub min_price: f64,
    pub count: usize,
}

/// Rank platforms by mean price ascending and take the top two.
/// Ties break by min price, then platform name, so equal inputs always
/// produce the same output. Returns 0, 1 or 2 entries depending on how
/// many platforms have records.
pub fn recommend(platform_summaries: &[PriceSummary]) -> Vec<Recommendation> {
    let mut ranked: Vec<&PriceSummary> = platform_summaries.iter().collect();
    ranked.sort_by(|a, b| {
        a.mean_price
            .total_cmp(&b.mean_price)
            .then(a.min_price.total_cmp(&b.min_price))
            .then(a.key.cmp(&b.key))
    });

    ranked
        .into_iter()
        .take(2)
        .map(|s| Recommendation {
            platform: s.key.clone(),
            mean_price: s.mean_price,
            min_price: s.min_price,
            count: s.count,
        })
        .collect()
}
