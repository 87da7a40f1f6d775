//! The in-memory, append-only list of committed places.

use std::ops::Deref;
use std::sync::Arc;

use crate::db::{PlaceStore, StoreError};
use crate::models::{seed_places, Place};

/// Ordered sequence of places; insertion order is display order.
///
/// The list is shared behind an [`Arc`] and never edited in place.
/// [`PlaceCollection::append`] produces a new snapshot, so a reader holding an
/// older value always sees a complete, consistent list, and a change of state
/// is detectable by identity with [`PlaceCollection::same_snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCollection {
    places: Arc<[Place]>,
}

impl PlaceCollection {
    pub fn new(places: Vec<Place>) -> Self {
        Self {
            places: places.into(),
        }
    }

    pub fn seed() -> Self {
        Self::new(seed_places())
    }

    /// Hydrate from the store, falling back to the seed list when nothing is
    /// stored or the stored blob cannot be used.
    pub fn initialize<S: PlaceStore + ?Sized>(store: &S) -> Self {
        match store.load() {
            Ok(Some(places)) => {
                tracing::info!(count = places.len(), "Loaded stored places");
                Self::new(places)
            }
            Ok(None) => {
                tracing::info!("No stored places, using seed data");
                Self::seed()
            }
            Err(StoreError::Malformed(e)) => {
                tracing::warn!(error = %e, "Stored places are malformed, using seed data");
                Self::seed()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored places, using seed data");
                Self::seed()
            }
        }
    }

    /// Return a new collection with `place` at the end.
    pub fn append(&self, place: Place) -> Self {
        let mut places = Vec::with_capacity(self.places.len() + 1);
        places.extend(self.places.iter().cloned());
        places.push(place);
        Self::new(places)
    }

    pub fn same_snapshot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.places, &other.places)
    }

    pub fn as_slice(&self) -> &[Place] {
        &self.places
    }
}

impl Deref for PlaceCollection {
    type Target = [Place];

    fn deref(&self) -> &Self::Target {
        &self.places
    }
}
