//! Feeds location fixes into the store and resolves an address for each.

use futures::{Stream, StreamExt};
use tracing::debug;

use crate::geocoding::Geocoder;
use crate::http::HttpTransport;
use crate::store::LocationStore;
use crate::types::LocationCoordinate;

/// Drive `updates` until it ends, returning how many fixes were handled.
///
/// Fixes are handled one at a time: the next one is not read until the
/// previous address lookup has finished. Dropping the returned future stops
/// tracking and drops `updates` with it, which for a
/// [`crate::LocationUpdates`] also ends the platform subscription.
pub async fn track_addresses<S, T>(
    updates: S,
    store: &LocationStore,
    geocoder: &Geocoder<T>,
) -> usize
where
    S: Stream<Item = LocationCoordinate>,
    T: HttpTransport,
{
    let mut updates = std::pin::pin!(updates);
    let mut handled = 0;
    while let Some(location) = updates.next().await {
        store.update_location(location);
        let address = geocoder.resolve_address(location).await;
        store.set_address(location, address);
        handled += 1;
    }
    debug!(handled, "location stream ended");
    handled
}
