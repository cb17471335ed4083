//! Reverse geocoding: coordinate in, display address out.
//!
//! # Design
//! `GeocodingClient` holds only a base URL and an API key. It builds the
//! `HttpRequest` for a coordinate and parses the `HttpResponse` that comes
//! back; executing the round-trip is someone else's job. The mobile host does
//! it itself through the FFI. Async Rust callers wrap the client in a
//! [`Geocoder`] together with an [`HttpTransport`].
//!
//! An empty result set is not an error: the endpoint found nothing, and the
//! item simply shows [`ADDRESS_NOT_FOUND`].

use tracing::{debug, warn};
use url::form_urlencoded;

use crate::config::GeocoderConfig;
use crate::error::GeocodingError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::types::{GeocodingResponse, LocationCoordinate};

/// Shown in place of an address when none could be resolved.
pub const ADDRESS_NOT_FOUND: &str = "Address Not Found";

const GEOCODE_PATH: &str = "/maps/api/geocode/json";

/// Stateless request builder and response parser for the geocoding API.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    base_url: String,
    api_key: String,
}

impl GeocodingClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &GeocoderConfig) -> Self {
        Self::new(&config.base_url, &config.api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_reverse_geocode(&self, coordinate: LocationCoordinate) -> HttpRequest {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("latlng", &coordinate.latlng())
            .append_pair("key", &self.api_key)
            .finish();
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{GEOCODE_PATH}?{query}", self.base_url),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }

    /// Extract the first formatted address from a response.
    pub fn parse_reverse_geocode(&self, response: HttpResponse) -> Result<String, GeocodingError> {
        if response.status != 200 {
            return Err(GeocodingError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }

        let decoded: GeocodingResponse = serde_json::from_str(&response.body)
            .map_err(|e| GeocodingError::InvalidResponse(e.to_string()))?;

        match decoded.status.as_str() {
            "" | "OK" | "ZERO_RESULTS" => {}
            _ => {
                return Err(GeocodingError::Rejected {
                    status: decoded.status,
                    message: decoded.error_message,
                })
            }
        }

        match decoded.results.into_iter().next() {
            None => Ok(ADDRESS_NOT_FOUND.to_string()),
            Some(first) if first.formatted_address.trim().is_empty() => {
                Err(GeocodingError::InvalidResponse(
                    "first result has no formatted_address".to_string(),
                ))
            }
            Some(first) => Ok(first.formatted_address),
        }
    }
}

/// A [`GeocodingClient`] paired with something that can run its requests.
#[derive(Debug, Clone)]
pub struct Geocoder<T> {
    client: GeocodingClient,
    transport: T,
}

impl<T: HttpTransport> Geocoder<T> {
    pub fn new(client: GeocodingClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &GeocodingClient {
        &self.client
    }

    /// Resolve `coordinate`, surfacing every failure.
    pub async fn reverse_geocode(
        &self,
        coordinate: LocationCoordinate,
    ) -> Result<String, GeocodingError> {
        let request = self.client.build_reverse_geocode(coordinate);
        let response = self.transport.execute(request).await?;
        self.client.parse_reverse_geocode(response)
    }

    /// Resolve `coordinate`, falling back to [`ADDRESS_NOT_FOUND`] on error.
    pub async fn resolve_address(&self, coordinate: LocationCoordinate) -> String {
        match self.reverse_geocode(coordinate).await {
            Ok(address) => {
                debug!(latlng = %coordinate.latlng(), %address, "address resolved");
                address
            }
            Err(err) => {
                warn!(latlng = %coordinate.latlng(), error = %err, "reverse geocoding failed");
                ADDRESS_NOT_FOUND.to_string()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::error::TransportError;

    /// Transport that replays canned outcomes and records what it was sent.
    #[derive(Default)]
    pub struct ScriptedTransport {
        pub replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        pub sent: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn new(replies: Vec<Result<HttpResponse, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpTransport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError("no scripted reply".to_string())))
        }
    }

    pub fn ok_body(address: &str) -> HttpResponse {
        HttpResponse::new(
            200,
            format!(r#"{{"results":[{{"formatted_address":"{address}"}}],"status":"OK"}}"#),
        )
    }
}
