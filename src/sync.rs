//! Orchestration of the place list, the draft, the store and the map.
//!
//! All events (startup, map click, text input, submit, device position) are
//! handled to completion on the caller's thread. The place list only changes
//! by whole-value replacement; every replacement is followed by a save and a
//! marker rebuild, and a failure in one never skips the other.

use crate::collection::PlaceCollection;
use crate::db::PlaceStore;
use crate::map::{LocationError, MapSurface, MapViewAdapter, Viewport};
use crate::models::{Coordinate, CoordinateError, DraftError, PendingPlaceDraft, Place};

/// Which side effects of a state change went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Publication {
    pub persisted: bool,
    pub rendered: bool,
}

/// Result of submitting the draft.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Committed {
        place: Place,
        publication: Publication,
    },
    /// Nothing changed; the draft is kept as it was.
    Rejected(DraftError),
}

pub struct SyncController<P: PlaceStore, S: MapSurface> {
    store: P,
    map: MapViewAdapter<S>,
    places: PlaceCollection,
    draft: PendingPlaceDraft,
}

impl<P: PlaceStore, S: MapSurface> SyncController<P, S> {
    /// Mount the map, hydrate the place list and render it.
    #[tracing::instrument(name = "SyncController::start", skip_all)]
    pub fn start(store: P, mut map: MapViewAdapter<S>) -> Self {
        if let Err(e) = map.mount() {
            tracing::error!(error = %e, "Failed to mount map");
        }

        let places = PlaceCollection::initialize(&store);
        if let Err(e) = map.reconcile(&places) {
            tracing::error!(error = %e, "Failed to render markers");
        }

        Self {
            store,
            map,
            places,
            draft: PendingPlaceDraft::new(),
        }
    }

    /// Record a map click as the draft's coordinate.
    pub fn on_map_click(&mut self, lat: f64, lon: f64) -> Result<Coordinate, CoordinateError> {
        let coordinate = self.map.click(lat, lon).inspect_err(|e| {
            tracing::warn!(lat, lon, error = %e, "Ignoring click outside the map");
        })?;
        self.draft.set_coordinate(coordinate);
        Ok(coordinate)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.set_name(name);
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.set_description(description);
    }

    /// Whether the submit control should be enabled.
    ///
    /// Only reflects whether a location was picked; [`Self::submit`] still
    /// checks the whole draft.
    pub fn can_submit(&self) -> bool {
        self.draft.coordinate().is_some()
    }

    /// Commit the draft into the place list.
    pub fn submit(&mut self) -> Submission {
        let place = match self.draft.commit() {
            Ok(place) => place,
            Err(e) => {
                tracing::debug!(reason = %e, "Draft rejected");
                return Submission::Rejected(e);
            }
        };

        let next = self.places.append(place.clone());
        let publication = self.replace_places(next).unwrap_or(Publication {
            persisted: true,
            rendered: true,
        });
        self.draft.reset();

        tracing::info!(
            name = %place.name(),
            coordinate = %place.coordinate(),
            total = self.places.len(),
            "Place added"
        );
        Submission::Committed { place, publication }
    }

    /// Apply the device position lookup outcome to the viewport.
    pub fn on_location(&mut self, outcome: Result<Coordinate, LocationError>) -> Option<Viewport> {
        match self.map.apply_location(outcome) {
            Ok(viewport) => viewport,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to move map");
                None
            }
        }
    }

    /// Swap in a new place list and publish it.
    ///
    /// Returns `None` without touching the store or the map when `next` is the
    /// snapshot already held.
    fn replace_places(&mut self, next: PlaceCollection) -> Option<Publication> {
        if next.same_snapshot(&self.places) {
            return None;
        }
        self.places = next;
        Some(self.publish())
    }

    fn publish(&mut self) -> Publication {
        let persisted = match self.store.save(&self.places) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save places");
                false
            }
        };

        let rendered = match self.map.reconcile(&self.places) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render markers");
                false
            }
        };

        Publication {
            persisted,
            rendered,
        }
    }

    pub fn places(&self) -> &PlaceCollection {
        &self.places
    }

    pub fn draft(&self) -> &PendingPlaceDraft {
        &self.draft
    }

    pub fn map(&self) -> &MapViewAdapter<S> {
        &self.map
    }

    pub fn store(&self) -> &P {
        &self.store
    }
}
