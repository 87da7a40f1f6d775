use super::geolocation::LocationError;
use super::surface::{MapError, MapSurface, MarkerId, TileSource, Viewport};
use crate::models::{Coordinate, CoordinateError, Place};

/// Static settings for mounting a map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub container: String,
    pub tiles: TileSource,
    /// Shown at mount and whenever the device position is unavailable.
    pub default_view: Viewport,
    /// Zoom used when centering on the device position.
    pub located_zoom: u8,
}

/// Bridges a [`MapSurface`] and the place list.
///
/// Outbound, [`MapViewAdapter::reconcile`] rebuilds the marker set from a
/// place snapshot. Inbound, [`MapViewAdapter::click`] turns a raw click
/// position into a coordinate event.
pub struct MapViewAdapter<S: MapSurface> {
    surface: S,
    settings: MapSettings,
    markers: Vec<MarkerId>,
    interacted: bool,
}

impl<S: MapSurface> MapViewAdapter<S> {
    pub fn new(surface: S, settings: MapSettings) -> Self {
        Self {
            surface,
            settings,
            markers: Vec::new(),
            interacted: false,
        }
    }

    /// Mount the surface and show the default viewport.
    pub fn mount(&mut self) -> Result<(), MapError> {
        self.surface
            .mount(&self.settings.container, &self.settings.tiles)?;
        self.surface.set_view(self.settings.default_view)?;
        tracing::debug!(container = %self.settings.container, "Map mounted");
        Ok(())
    }

    /// Translate a click on the map into a coordinate event.
    ///
    /// Every click produces exactly one event; there is no debouncing. The
    /// click also counts as viewport interaction, so a device position that
    /// arrives afterwards no longer moves the map.
    pub fn click(&mut self, lat: f64, lon: f64) -> Result<Coordinate, CoordinateError> {
        self.interacted = true;
        let coordinate = Coordinate::wrapped(lat, lon)?;
        tracing::debug!(%coordinate, "Map clicked");
        Ok(coordinate)
    }

    /// Replace every rendered marker with one marker per place, in order.
    pub fn reconcile(&mut self, places: &[Place]) -> Result<(), MapError> {
        let stale = std::mem::take(&mut self.markers);
        let removed = stale.len();
        for id in stale {
            match self.surface.remove_marker(id) {
                Ok(()) | Err(MapError::UnknownMarker(_)) => {}
                Err(e) => return Err(e),
            }
        }

        for place in places {
            let id = self.surface.add_marker(place.coordinate(), place.popup())?;
            self.markers.push(id);
        }

        tracing::debug!(removed, added = self.markers.len(), "Markers reconciled");
        Ok(())
    }

    /// Apply the outcome of the device position lookup.
    ///
    /// Returns the viewport that was set, or `None` when the outcome was
    /// ignored because the user already interacted with the map.
    pub fn apply_location(
        &mut self,
        outcome: Result<Coordinate, LocationError>,
    ) -> Result<Option<Viewport>, MapError> {
        if self.interacted {
            tracing::debug!("Ignoring device position, map already in use");
            return Ok(None);
        }

        let viewport = match outcome {
            Ok(center) => {
                tracing::info!(%center, "Centering map on device position");
                Viewport {
                    center,
                    zoom: self.settings.located_zoom,
                }
            }
            Err(e) => {
                tracing::info!(error = %e, "Device position unavailable, using default view");
                self.settings.default_view
            }
        };
        self.surface.set_view(viewport)?;
        Ok(Some(viewport))
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn has_interacted(&self) -> bool {
        self.interacted
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }
}
