//! Domain models.
//!
//! - [`Place`]: a committed, immutable location with a name, a description and a
//!   [`Coordinate`]. Places are only ever appended, never edited.
//! - [`PendingPlaceDraft`]: the place being assembled from map clicks and text
//!   input. It lives in memory only and is cleared after a successful commit.
//! - [`seed_places`]: the list shown before anything has been stored.

mod draft;
mod place;

pub use draft::*;
pub use place::*;
