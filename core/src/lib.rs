//! Core of the location-tagged shopping list.
//!
//! # Overview
//! Everything here is UI-free and platform-free. The host renders the list,
//! shows the permission prompt, owns the OS location service and, when it
//! wants to, performs HTTP round-trips itself (host-does-IO pattern). This
//! crate decides what those round-trips, prompts and list transitions are.
//!
//! # Design
//! - [`ShoppingListController`] owns the items and the single in-progress
//!   edit; ids never repeat within a list.
//! - [`LocationProvider`] turns the platform's callbacks into a
//!   [`LocationUpdates`] stream whose `Drop` ends the subscription.
//! - [`PermissionFlow`] is the state machine behind the "Address" button.
//! - [`GeocodingClient`] builds and parses reverse-geocoding requests;
//!   [`Geocoder`] runs them over an [`HttpTransport`] for async callers.
//! - [`LocationStore`] holds the latest fix and its address, and
//!   [`track_addresses`] keeps it current from a location stream.

pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod list;
pub mod location;
pub mod permission;
pub mod store;
pub mod tracker;
pub mod types;

pub use config::{AppConfig, GeocoderConfig};
pub use error::{ConfigError, GeocodingError, ListError, LocationError, TransportError};
pub use geocoding::{Geocoder, GeocodingClient, ADDRESS_NOT_FOUND};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use list::{ItemDraft, ShoppingListController};
pub use location::{
    LocationPlatform, LocationProvider, LocationRequest, LocationSink, LocationUpdates, Permission,
    Priority, SubscriptionId,
};
pub use permission::{Denial, FlowAction, PermissionFlow, PermissionGrant, PermissionState};
pub use store::{LocationSnapshot, LocationStore};
pub use tracker::track_addresses;
pub use types::{
    GeocodingResponse, GeocodingResult, ItemId, ItemView, LocationCoordinate, ShoppingItem,
};
