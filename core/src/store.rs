//! Latest known location and the address resolved for it.

use tokio::sync::watch;

use crate::types::LocationCoordinate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationSnapshot {
    pub location: Option<LocationCoordinate>,
    /// Last resolved address. Kept across later fixes until a newer lookup
    /// replaces it.
    pub address: Option<String>,
    /// The fix `address` was resolved for.
    pub resolved_at: Option<LocationCoordinate>,
}

/// Single holder of the latest location, readable through watch receivers.
#[derive(Debug)]
pub struct LocationStore {
    tx: watch::Sender<LocationSnapshot>,
}

impl Default for LocationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LocationSnapshot::default());
        Self { tx }
    }

    pub fn update_location(&self, location: LocationCoordinate) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.location == Some(location) {
                return false;
            }
            snapshot.location = Some(location);
            true
        });
    }

    /// Record the address for `location`.
    ///
    /// Ignored when the store has already moved on to another location, so
    /// a slow lookup never overwrites the address of a newer fix.
    pub fn set_address(&self, location: LocationCoordinate, address: impl Into<String>) -> bool {
        let address = address.into();
        self.tx.send_if_modified(|snapshot| {
            if snapshot.location == Some(location) {
                snapshot.address = Some(address);
                snapshot.resolved_at = Some(location);
                true
            } else {
                false
            }
        })
    }

    pub fn latest(&self) -> Option<LocationCoordinate> {
        self.tx.borrow().location
    }

    pub fn address(&self) -> Option<String> {
        self.tx.borrow().address.clone()
    }

    /// The address to stamp on a new or edited item; empty until the first
    /// lookup lands.
    pub fn current_address(&self) -> String {
        self.address().unwrap_or_default()
    }

    /// Whether the held address was resolved for the latest fix.
    pub fn is_address_current(&self) -> bool {
        let snapshot = self.tx.borrow();
        snapshot.address.is_some() && snapshot.resolved_at == snapshot.location
    }

    pub fn snapshot(&self) -> LocationSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LocationSnapshot> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let store = LocationStore::new();
        assert_eq!(store.latest(), None);
        assert_eq!(store.current_address(), "");
    }

    #[test]
    fn address_follows_its_location() {
        let store = LocationStore::new();
        let here = LocationCoordinate::new(51.5, -0.1);
        let there = LocationCoordinate::new(48.8, 2.3);

        store.update_location(here);
        assert!(store.set_address(here, "London"));
        assert_eq!(store.current_address(), "London");

        store.update_location(here);
        assert_eq!(store.address().as_deref(), Some("London"));

        store.update_location(there);
        assert!(!store.set_address(here, "Old London"));
        assert_eq!(store.latest(), Some(there));
        assert_eq!(store.current_address(), "London");
        assert!(!store.is_address_current());

        assert!(store.set_address(there, "Paris"));
        assert_eq!(store.current_address(), "Paris");
        assert!(store.is_address_current());
    }

    #[test]
    fn jittered_fix_keeps_resolved_address() {
        let store = LocationStore::new();
        let here = LocationCoordinate::new(51.5237, -0.1585);
        store.update_location(here);
        store.set_address(here, "221B Baker St");

        store.update_location(LocationCoordinate::new(51.52371, -0.1585));

        assert_eq!(store.current_address(), "221B Baker St");
        assert_eq!(store.snapshot().resolved_at, Some(here));
    }

    #[tokio::test]
    async fn repeated_fix_does_not_notify() {
        let store = LocationStore::new();
        let mut rx = store.subscribe();
        let here = LocationCoordinate::new(1.0, 2.0);

        store.update_location(here);
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        store.update_location(here);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn subscribers_see_updates() {
        let store = LocationStore::new();
        let mut rx = store.subscribe();
        let here = LocationCoordinate::new(1.0, 2.0);

        store.update_location(here);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().location, Some(here));

        store.set_address(here, "Somewhere");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().address.as_deref(), Some("Somewhere"));
    }
}
