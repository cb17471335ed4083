//! Bridge between the platform location service and the rest of the core.
//!
//! # Design
//! The platform is a trait, [`LocationPlatform`], implemented by the host.
//! A subscription is a [`LocationUpdates`] stream: the platform pushes
//! batches into a [`LocationSink`], the consumer polls coordinates out in
//! arrival order. Dropping the stream is the only way a subscription ends,
//! and `Drop` always tells the platform to stop, so a listener cannot
//! outlive the screen that asked for it.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::error::LocationError;
use crate::types::LocationCoordinate;

/// The two location grants the subscription needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    FineLocation,
    CoarseLocation,
}

impl Permission {
    pub const ALL: [Permission; 2] = [Permission::FineLocation, Permission::CoarseLocation];

    /// Platform identifier, as passed to the OS permission prompt.
    pub fn identifier(&self) -> &'static str {
        match self {
            Permission::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Permission::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    HighAccuracy,
    Balanced,
    LowPower,
    Passive,
}

/// Parameters handed to the platform when subscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRequest {
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "interval_ms", with = "millis", default = "default_interval")]
    pub interval: Duration,
}

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            priority: Priority::HighAccuracy,
            interval: DEFAULT_INTERVAL,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Opaque identifier of one platform subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sending half of a subscription, held by the platform.
#[derive(Debug, Clone)]
pub struct LocationSink {
    tx: mpsc::UnboundedSender<LocationCoordinate>,
}

impl LocationSink {
    /// Forward the most recent sample of `batch`. Empty batches are ignored.
    ///
    /// Returns false once the subscriber is gone; the platform may use that
    /// to stop delivering early.
    pub fn deliver(&self, batch: &[LocationCoordinate]) -> bool {
        match batch.last() {
            Some(latest) => self.tx.send(*latest).is_ok(),
            None => !self.tx.is_closed(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The OS location service, as seen by the core.
pub trait LocationPlatform: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;

    /// Begin pushing fixes for `id` into `sink` until `stop_updates(id)`.
    fn start_updates(&self, id: SubscriptionId, request: &LocationRequest, sink: LocationSink);

    fn stop_updates(&self, id: SubscriptionId);
}

/// Permission check and subscription entry point.
pub struct LocationProvider {
    platform: Arc<dyn LocationPlatform>,
}

impl LocationProvider {
    pub fn new(platform: Arc<dyn LocationPlatform>) -> Self {
        Self { platform }
    }

    /// True only when both fine and coarse location are granted.
    pub fn has_permission(&self) -> bool {
        Permission::ALL.iter().all(|p| self.platform.is_granted(*p))
    }

    /// Subscribe to location fixes.
    ///
    /// The returned stream yields every fix in arrival order, without
    /// deduplication, until it is dropped.
    pub fn request_location_updates(
        &self,
        request: LocationRequest,
    ) -> Result<LocationUpdates, LocationError> {
        if !self.has_permission() {
            return Err(LocationError::PermissionDenied);
        }

        let id = SubscriptionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.platform.start_updates(id, &request, LocationSink { tx });
        debug!(%id, interval_ms = request.interval.as_millis() as u64, "location updates started");

        Ok(LocationUpdates {
            id,
            rx,
            platform: Arc::clone(&self.platform),
        })
    }
}

/// A live location subscription. Ends when dropped.
pub struct LocationUpdates {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<LocationCoordinate>,
    platform: Arc<dyn LocationPlatform>,
}

impl LocationUpdates {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// End the subscription now rather than at end of scope.
    pub fn cancel(self) {}
}

impl Stream for LocationUpdates {
    type Item = LocationCoordinate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for LocationUpdates {
    fn drop(&mut self) {
        self.rx.close();
        self.platform.stop_updates(self.id);
        debug!(id = %self.id, "location updates stopped");
    }
}

impl fmt::Debug for LocationUpdates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationUpdates").field("id", &self.id).finish()
    }
}
