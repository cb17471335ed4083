use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

/// Degrees within which a request matches a registered place.
pub const MATCH_TOLERANCE: f64 = 1e-4;

pub const DEFAULT_API_KEY: &str = "test-key";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub place_id: String,
    pub types: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub results: Vec<GeocodeResult>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GeocodeResponse {
    fn failure(status: &str, message: &str) -> Self {
        Self {
            results: Vec::new(),
            status: status.to_string(),
            error_message: Some(message.to_string()),
        }
    }
}

#[derive(Deserialize)]
pub struct GeocodeQuery {
    pub latlng: Option<String>,
    pub key: Option<String>,
}

pub struct Geo {
    pub api_key: String,
    pub places: Vec<Place>,
}

/// Read-only after startup.
pub type SharedGeo = Arc<Geo>;

/// Places every test can rely on.
pub fn seed_places() -> Vec<Place> {
    vec![
        Place {
            lat: 51.5237,
            lng: -0.1585,
            formatted_address: "221B Baker St, London NW1 6XE, UK".to_string(),
        },
        Place {
            lat: 40.7484,
            lng: -73.9857,
            formatted_address: "20 W 34th St., New York, NY 10001, USA".to_string(),
        },
    ]
}

pub fn app() -> Router {
    app_with(DEFAULT_API_KEY, seed_places())
}

pub fn app_with(api_key: &str, places: Vec<Place>) -> Router {
    let geo: SharedGeo = Arc::new(Geo {
        api_key: api_key.to_string(),
        places,
    });
    Router::new()
        .route("/maps/api/geocode/json", get(reverse_geocode))
        .route("/health", get(health))
        .with_state(geo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(
    listener: TcpListener,
    api_key: &str,
    places: Vec<Place>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(api_key, places)).await
}

async fn health() -> &'static str {
    "ok"
}

/// Mirrors the real endpoint: always HTTP 200, outcome in `status`.
async fn reverse_geocode(
    State(geo): State<SharedGeo>,
    Query(query): Query<GeocodeQuery>,
) -> Json<GeocodeResponse> {
    if query.key.as_deref() != Some(geo.api_key.as_str()) {
        return Json(GeocodeResponse::failure(
            "REQUEST_DENIED",
            "The provided API key is invalid.",
        ));
    }

    let Some((lat, lng)) = query.latlng.as_deref().and_then(parse_latlng) else {
        return Json(GeocodeResponse::failure(
            "INVALID_REQUEST",
            "Invalid request. Invalid 'latlng' parameter.",
        ));
    };

    let mut matches: Vec<(f64, &Place)> = geo
        .places
        .iter()
        .map(|p| ((p.lat - lat).abs().max((p.lng - lng).abs()), p))
        .filter(|(distance, _)| *distance <= MATCH_TOLERANCE)
        .collect();
    matches.sort_by(|a, b| a.0.total_cmp(&b.0));
    debug!(lat, lng, matches = matches.len(), "reverse geocode");

    let results: Vec<GeocodeResult> = matches
        .into_iter()
        .enumerate()
        .map(|(i, (_, p))| GeocodeResult {
            formatted_address: p.formatted_address.clone(),
            place_id: format!("mock-{i}"),
            types: vec!["street_address".to_string()],
        })
        .collect();
    let status = if results.is_empty() { "ZERO_RESULTS" } else { "OK" };
    Json(GeocodeResponse {
        results,
        status: status.to_string(),
        error_message: None,
    })
}

/// Parse `"{lat},{lng}"`.
pub fn parse_latlng(value: &str) -> Option<(f64, f64)> {
    let (lat, lng) = value.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some((lat, lng))
}
