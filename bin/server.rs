// Laptop Scout - Web Server
// JSON API over the filter → aggregate → recommend pipeline

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use laptop_scout::{
    aggregate, filter, recommend, BrandPrices, CriteriaError, FilterCriteria, ListingRecord,
    Overview, PriceSummary, Recommendation, RecordStore, Selection,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state. The record store is immutable after load,
/// so handlers share it without locking.
#[derive(Clone)]
struct AppState {
    store: Arc<RecordStore>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(error: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(error),
        }
    }
}

/// Filter criteria from the query string. Multi-value fields are
/// comma-separated; absent means unrestricted.
#[derive(Deserialize, Default)]
struct CriteriaQuery {
    brands: Option<String>,
    platforms: Option<String>,
    cities: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
}

impl CriteriaQuery {
    fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            brands: parse_selection(self.brands),
            platforms: parse_selection(self.platforms),
            cities: parse_selection(self.cities),
            min_price: self.min_price.unwrap_or(0.0),
            max_price: self.max_price.unwrap_or(f64::MAX),
        }
    }
}

fn parse_selection(param: Option<String>) -> Selection {
    match param {
        None => Selection::All,
        Some(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("all") => Selection::All,
        Some(s) => Selection::only(s.split(',').map(|v| v.trim().to_string())),
    }
}

/// Invalid criteria is a client error; empty results are not.
fn criteria_error_response(err: CriteriaError) -> axum::response::Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::err(err.to_string())),
    )
        .into_response()
}

/// Stats response: overview plus all three grouped views.
#[derive(Serialize)]
struct StatsResponse {
    total_listings: usize,
    overview: Option<Overview>,
    by_platform: Vec<PriceSummary>,
    by_brand: Vec<BrandPrices>,
    by_date: Vec<PriceSummary>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/listings - Filtered listings, store order preserved
async fn get_listings(
    State(state): State<AppState>,
    Query(query): Query<CriteriaQuery>,
) -> impl IntoResponse {
    match filter(&state.store, &query.into_criteria()) {
        Ok(listings) => (StatusCode::OK, Json(ApiResponse::ok(listings))).into_response(),
        Err(e) => criteria_error_response(e),
    }
}

/// GET /api/stats - Overview and grouped summaries for the filtered view
async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<CriteriaQuery>,
) -> impl IntoResponse {
    let filtered = match filter(&state.store, &query.into_criteria()) {
        Ok(filtered) => filtered,
        Err(e) => return criteria_error_response(e),
    };

    let mut by_platform = aggregate::by_platform(&filtered);
    by_platform.sort_by(|a, b| a.key.cmp(&b.key));

    let stats = StatsResponse {
        total_listings: filtered.len(),
        overview: aggregate::overview(&filtered),
        by_platform,
        by_brand: aggregate::by_brand(&filtered),
        by_date: aggregate::by_date(&filtered),
    };

    (StatusCode::OK, Json(ApiResponse::ok(stats))).into_response()
}

/// GET /api/recommendations - Top-2 cheapest platforms for the filtered view
async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<CriteriaQuery>,
) -> impl IntoResponse {
    match filter(&state.store, &query.into_criteria()) {
        Ok(filtered) => {
            let picks: Vec<Recommendation> = recommend(&aggregate::by_platform(&filtered));
            (StatusCode::OK, Json(ApiResponse::ok(picks))).into_response()
        }
        Err(e) => criteria_error_response(e),
    }
}

/// GET /api/platforms/:name - All listings for one platform
async fn get_platform_listings(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    // Decode URL-encoded platform names ("Reliance%20Digital")
    let decoded_name = urlencoding::decode(&name)
        .unwrap_or_else(|_| name.clone().into())
        .into_owned();

    let listings: Vec<ListingRecord> = state
        .store
        .records()
        .iter()
        .filter(|r| r.platform == decoded_name)
        .cloned()
        .collect();

    (StatusCode::OK, Json(ApiResponse::ok(listings))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Laptop Scout - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let data_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/laptop_prices.csv".to_string());
    let data_path = std::path::Path::new(&data_path);

    if !data_path.exists() {
        eprintln!("❌ Dataset not found at {}", data_path.display());
        eprintln!("   Pass the CSV path as the first argument.");
        std::process::exit(1);
    }

    let report = laptop_scout::load_csv(data_path).expect("Failed to load dataset");
    println!(
        "✓ Loaded {} listings ({} rows rejected)",
        report.store.len(),
        report.rejected.len()
    );

    // Create shared state
    let state = AppState {
        store: Arc::new(report.store),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/listings", get(get_listings))
        .route("/stats", get(get_stats))
        .route("/recommendations", get(get_recommendations))
        .route("/platforms/:name", get(get_platform_listings))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/listings");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
