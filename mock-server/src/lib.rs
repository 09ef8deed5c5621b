use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Country code of entries that apply to every country.
pub const GLOBAL_COUNTRY: &str = "XX";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTarget {
    pub url: String,
    pub category_code: String,
    pub country_code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UrlsQuery {
    pub country_code: Option<String>,
    pub category_codes: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlsResponse {
    pub metadata: Metadata,
    pub results: Vec<TestTarget>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub type Catalogue = Arc<Vec<TestTarget>>;

fn target(url: &str, category_code: &str, country_code: &str) -> TestTarget {
    TestTarget {
        url: url.to_string(),
        category_code: category_code.to_string(),
        country_code: country_code.to_string(),
    }
}

/// Small fixed catalogue, in the order the service returns it.
pub fn default_catalogue() -> Vec<TestTarget> {
    vec![
        target("https://www.amnesty.org/", "HUMR", GLOBAL_COUNTRY),
        target("https://www.greenpeace.org/", "ENV", GLOBAL_COUNTRY),
        target("https://www.torproject.org/", "ANON", GLOBAL_COUNTRY),
        target("https://www.hrw.org/", "HUMR", GLOBAL_COUNTRY),
        target("http://www.legambiente.it/", "ENV", "IT"),
        target("https://www.osservatoriorepressione.info/", "HUMR", "IT"),
        target("https://www.repubblica.it/", "NEWS", "IT"),
        target("https://www.lemonde.fr/", "NEWS", "FR"),
    ]
}

pub fn app() -> Router {
    app_with_catalogue(default_catalogue())
}

pub fn app_with_catalogue(targets: Vec<TestTarget>) -> Router {
    let catalogue: Catalogue = Arc::new(targets);
    Router::new()
        .route("/api/v1/urls", get(list_urls))
        .with_state(catalogue)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock orchestrate service listening");
    }
    axum::serve(listener, app).await
}

/// Entries for `country` (plus global ones) whose category is in `categories`,
/// cut to `limit` when it is non-zero. Empty filters match everything.
pub fn select(targets: &[TestTarget], query: &UrlsQuery) -> Vec<TestTarget> {
    let country = query
        .country_code
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(str::to_ascii_uppercase);
    let categories: Vec<String> = query
        .category_codes
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter(|c| !c.is_empty())
        .map(str::to_ascii_uppercase)
        .collect();

    let matching = targets.iter().filter(|t| match &country {
        Some(c) => t.country_code == *c || t.country_code == GLOBAL_COUNTRY,
        None => true,
    });
    let matching = matching.filter(|t| categories.is_empty() || categories.contains(&t.category_code));

    match query.limit {
        Some(limit) if limit > 0 => matching.take(limit as usize).cloned().collect(),
        _ => matching.cloned().collect(),
    }
}

async fn list_urls(
    State(catalogue): State<Catalogue>,
    Query(query): Query<UrlsQuery>,
) -> Result<Json<UrlsResponse>, (StatusCode, Json<ErrorBody>)> {
    if let Some(country) = query.country_code.as_deref() {
        if !country.is_empty() && !(country.len() == 2 && country.chars().all(|c| c.is_ascii_alphabetic())) {
            tracing::warn!(country, "rejecting invalid country code");
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: format!("invalid country_code: {country}"),
                }),
            ));
        }
    }

    let results = select(&catalogue, &query);
    tracing::info!(?query, count = results.len(), "serving test list");
    Ok(Json(UrlsResponse {
        metadata: Metadata {
            count: results.len(),
        },
        results,
    }))
}
