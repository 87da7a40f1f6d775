//! Headless map surface that keeps markers in memory and renders them as text.

use super::surface::{MapError, MapSurface, MarkerId, TileSource, Viewport};
use crate::models::{Coordinate, Popup};

const MARKER: char = '●';

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub id: MarkerId,
    pub at: Coordinate,
    pub popup: Popup,
    /// Popup markup as an HTML surface would bind it.
    pub html: String,
}

/// A [`MapSurface`] without a screen.
///
/// Used by the CLI and by tests. Markers are kept in the order they were
/// added, and the add/remove calls are counted so callers can check how much
/// work a reconcile did.
#[derive(Debug, Default)]
pub struct MemorySurface {
    container: Option<String>,
    tiles: Option<TileSource>,
    markers: Vec<RenderedMarker>,
    viewport: Option<Viewport>,
    added: usize,
    removed: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn tiles(&self) -> Option<&TileSource> {
        self.tiles.as_ref()
    }

    pub fn markers(&self) -> &[RenderedMarker] {
        &self.markers
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Total markers ever added.
    pub fn added(&self) -> usize {
        self.added
    }

    /// Total markers ever removed.
    pub fn removed(&self) -> usize {
        self.removed
    }

    fn ensure_mounted(&self) -> Result<(), MapError> {
        if self.container.is_none() {
            return Err(MapError::NotMounted);
        }
        Ok(())
    }
}

impl MapSurface for MemorySurface {
    fn mount(&mut self, container: &str, tiles: &TileSource) -> Result<(), MapError> {
        self.container = Some(container.to_string());
        self.tiles = Some(tiles.clone());
        Ok(())
    }

    fn add_marker(&mut self, at: Coordinate, popup: Popup) -> Result<MarkerId, MapError> {
        self.ensure_mounted()?;
        let id = MarkerId::new();
        let html = popup.html();
        self.markers.push(RenderedMarker {
            id,
            at,
            popup,
            html,
        });
        self.added += 1;
        Ok(id)
    }

    fn remove_marker(&mut self, id: MarkerId) -> Result<(), MapError> {
        self.ensure_mounted()?;
        let index = self
            .markers
            .iter()
            .position(|m| m.id == id)
            .ok_or(MapError::UnknownMarker(id))?;
        self.markers.remove(index);
        self.removed += 1;
        Ok(())
    }

    fn set_view(&mut self, viewport: Viewport) -> Result<(), MapError> {
        self.ensure_mounted()?;
        self.viewport = Some(viewport);
        Ok(())
    }
}

/// Render the surface as a marker tree.
///
/// Example output:
/// ```text
/// map @ -23.5505, -46.6333 (zoom 12)
/// ├── ● Bar do Zé [-23.5587, -46.6253]
/// │     Mesa oficial e cerveja gelada.
/// └── ● Boteco da Esquina [-23.5432, -46.6388]
///       Mesa de sinuca e música ao vivo.
/// ```
pub fn render_markers(surface: &MemorySurface) -> String {
    let mut output = String::new();

    output.push_str(surface.container().unwrap_or("(unmounted)"));
    match surface.viewport() {
        Some(view) => {
            output.push_str(&format!(" @ {} (zoom {})", view.center, view.zoom));
        }
        None => output.push_str(" (no view)"),
    }
    output.push('\n');

    let markers = surface.markers();
    for (i, marker) in markers.iter().enumerate() {
        let is_last = i == markers.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        let continuation = if is_last { "      " } else { "│     " };

        output.push_str(branch);
        output.push(MARKER);
        output.push(' ');
        output.push_str(&format!("{} [{}]\n", marker.popup.title, marker.at));
        output.push_str(continuation);
        output.push_str(&marker.popup.body);
        output.push('\n');
    }
    output
}

/// Render each marker's popup markup, one per line, in marker order.
pub fn render_popups(surface: &MemorySurface) -> String {
    let mut output = String::new();
    for marker in surface.markers() {
        output.push_str(&marker.html);
        output.push('\n');
    }
    output
}
