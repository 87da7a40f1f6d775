use thiserror::Error;

use super::Database;
use crate::models::Place;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed: {0:#}")]
    Backend(anyhow::Error),

    #[error("stored places are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<anyhow::Error> for StoreError {
    fn from(e: anyhow::Error) -> Self {
        Self::Backend(e)
    }
}

/// Durable home of the place list.
///
/// `load` returns `Ok(None)` when nothing has been stored yet. `save` replaces
/// the whole list.
pub trait PlaceStore {
    fn load(&self) -> Result<Option<Vec<Place>>, StoreError>;

    fn save(&self, places: &[Place]) -> Result<(), StoreError>;
}

/// The place list kept as a single JSON array under one key of a [`Database`].
#[derive(Clone)]
pub struct StoredPlaces {
    db: Database,
    key: String,
}

impl StoredPlaces {
    pub fn new(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }
}

impl PlaceStore for StoredPlaces {
    fn load(&self) -> Result<Option<Vec<Place>>, StoreError> {
        let Some(blob) = self.db.get_blob(&self.key)? else {
            return Ok(None);
        };
        let places: Vec<Place> = serde_json::from_str(&blob)?;
        Ok(Some(places))
    }

    fn save(&self, places: &[Place]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(places)?;
        self.db.put_blob(&self.key, &blob)?;
        tracing::debug!(key = %self.key, count = places.len(), "Saved places");
        Ok(())
    }
}
