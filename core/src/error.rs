//! Error types for the shopping list core.
//!
//! # Design
//! One enum per concern. List errors are validation failures the UI
//! recovers from by prompting for a correction. Geocoding errors never reach
//! the user directly: [`crate::Geocoder::resolve_address`] turns every one of
//! them into the "Address Not Found" sentinel, but the typed error is kept so
//! the host can log or retry.

use thiserror::Error;

use crate::types::ItemId;

/// Rejections from [`crate::ShoppingListController`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// The item name was empty or whitespace only.
    #[error("item name must not be blank")]
    EmptyName,

    /// The quantity text did not parse as an integer.
    #[error("quantity {text:?} is not a whole number")]
    InvalidQuantity { text: String },

    #[error("no item with id {0}")]
    ItemNotFound(ItemId),
}

impl ListError {
    /// True for the errors caused by what the user typed.
    pub fn is_validation(&self) -> bool {
        matches!(self, ListError::EmptyName | ListError::InvalidQuantity { .. })
    }
}

/// Errors from the location subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// Fine and coarse location must both be granted before subscribing.
    #[error("location permission has not been granted")]
    PermissionDenied,
}

/// Failure to reach the geocoding endpoint at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

/// Errors from reverse geocoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodingError {
    /// The endpoint could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-200 status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The body was not a geocoding response, or held no usable address.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The API refused the request (bad key, malformed coordinate, quota).
    #[error("geocoding rejected with status {status}{}", detail(.message))]
    Rejected {
        status: String,
        message: Option<String>,
    },
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

impl From<TransportError> for GeocodingError {
    fn from(err: TransportError) -> Self {
        GeocodingError::Network(err.0)
    }
}

/// Errors loading [`crate::AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("geocoder api_key must be set")]
    MissingApiKey,

    #[error("location interval must be greater than zero")]
    ZeroInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display_includes_message_when_present() {
        let err = GeocodingError::Rejected {
            status: "REQUEST_DENIED".to_string(),
            message: Some("The provided API key is invalid.".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "geocoding rejected with status REQUEST_DENIED: The provided API key is invalid."
        );

        let err = GeocodingError::Rejected {
            status: "OVER_QUERY_LIMIT".to_string(),
            message: None,
        };
        assert_eq!(err.to_string(), "geocoding rejected with status OVER_QUERY_LIMIT");
    }

    #[test]
    fn transport_error_becomes_network_error() {
        let err: GeocodingError = TransportError("connection refused".to_string()).into();
        assert_eq!(err, GeocodingError::Network("connection refused".to_string()));
    }

    #[test]
    fn validation_errors_are_flagged() {
        assert!(ListError::EmptyName.is_validation());
        assert!(ListError::InvalidQuantity { text: "two".into() }.is_validation());
        assert!(!ListError::ItemNotFound(ItemId(4)).is_validation());
    }
}
