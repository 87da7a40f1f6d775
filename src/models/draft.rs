use thiserror::Error;

use super::place::{Coordinate, Place, PlaceError};

/// Why a draft could not be turned into a [`Place`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("name is required")]
    MissingName,

    #[error("description is required")]
    MissingDescription,

    #[error("click the map to mark the location")]
    MissingCoordinate,
}

/// A place under construction.
///
/// Each slot is filled independently and every setter overwrites. The
/// coordinate behaves as a single-slot mailbox: the last map click before
/// submission wins. Drafts are never persisted.
///
/// Emptiness is a plain empty-string check; whitespace-only text counts as
/// filled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingPlaceDraft {
    name: String,
    description: String,
    coordinate: Option<Coordinate>,
}

impl PendingPlaceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.coordinate = Some(coordinate);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_none()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn missing(&self) -> Option<DraftError> {
        if self.coordinate.is_none() {
            Some(DraftError::MissingCoordinate)
        } else if self.name.is_empty() {
            Some(DraftError::MissingName)
        } else if self.description.is_empty() {
            Some(DraftError::MissingDescription)
        } else {
            None
        }
    }

    /// Snapshot the draft into a [`Place`].
    ///
    /// Leaves the draft untouched; the caller resets it after the place has
    /// been accepted into the collection.
    pub fn commit(&self) -> Result<Place, DraftError> {
        if let Some(err) = self.missing() {
            return Err(err);
        }
        let coordinate = self.coordinate.ok_or(DraftError::MissingCoordinate)?;
        Place::new(self.name.clone(), self.description.clone(), coordinate).map_err(|e| match e {
            PlaceError::EmptyName => DraftError::MissingName,
            PlaceError::EmptyDescription => DraftError::MissingDescription,
            PlaceError::Coordinate(_) => DraftError::MissingCoordinate,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
