use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Coordinate, Popup};

/// Errors raised by a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map surface is not mounted")]
    NotMounted,

    #[error("unknown marker: {0}")]
    UnknownMarker(MarkerId),
}

/// Handle of a marker on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub Uuid);

impl MarkerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MarkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Where map tiles come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSource {
    /// URL template with `{s}`, `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileSource {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
        }
    }
}

/// Center and zoom level of the visible map area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

/// The map widget the adapter drives.
///
/// Implementations wrap whatever actually draws tiles and markers. Click
/// events travel the other way: the embedding forwards them to
/// [`MapViewAdapter::click`](super::MapViewAdapter::click).
pub trait MapSurface {
    fn mount(&mut self, container: &str, tiles: &TileSource) -> Result<(), MapError>;

    /// Add a marker with its popup already bound.
    fn add_marker(&mut self, at: Coordinate, popup: Popup) -> Result<MarkerId, MapError>;

    fn remove_marker(&mut self, id: MarkerId) -> Result<(), MapError>;

    fn set_view(&mut self, viewport: Viewport) -> Result<(), MapError>;
}
