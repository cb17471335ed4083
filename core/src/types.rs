//! Domain types shared by the list controller, the location flow and the
//! geocoding client.
//!
//! # Design
//! `ShoppingItem` carries no editing flag. Which item is being edited is a
//! property of the list, held once by the controller, and only shows up
//! again in the `ItemView` snapshots handed to the presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an item in the list. Never reused within one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single entry in the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: i32,
    /// Display address captured when the item was added or last edited.
    /// Empty when no address had been resolved yet.
    pub address: String,
}

/// What the presentation layer renders for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub quantity: i32,
    pub is_editing: bool,
    pub address: String,
}

impl ItemView {
    pub(crate) fn new(item: &ShoppingItem, is_editing: bool) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            quantity: item.quantity,
            is_editing,
            address: item.address.clone(),
        }
    }
}

/// A latitude/longitude pair as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// The `latlng` query value expected by the geocoding endpoint.
    pub fn latlng(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Decoded body of a reverse-geocoding response.
///
/// Only the fields this crate reads are modelled; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Vec<GeocodingResult>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// One candidate address for a coordinate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeocodingResult {
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}
