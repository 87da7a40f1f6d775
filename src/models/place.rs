use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a latitude/longitude pair is not a usable map position.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("coordinate is not a finite number")]
    NotFinite,

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A geographic position in decimal degrees.
///
/// Serialized as a two-element array with latitude first, which is the layout
/// the persisted place list uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Build a coordinate from a raw map-surface position.
    ///
    /// Surfaces that let the user pan across the antimeridian report
    /// longitudes beyond ±180; those are wrapped back into range. Latitude is
    /// never adjusted.
    pub fn wrapped(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lon.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        let lon = if (-180.0..=180.0).contains(&lon) {
            lon
        } else {
            (lon + 180.0).rem_euclid(360.0) - 180.0
        };
        Self::new(lat, lon)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl TryFrom<[f64; 2]> for Coordinate {
    type Error = CoordinateError;

    fn try_from([lat, lon]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(lat, lon)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lon]
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Errors raised when a place record violates its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaceError {
    #[error("place name is empty")]
    EmptyName,

    #[error("place description is empty")]
    EmptyDescription,

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

/// A committed location of interest.
///
/// Places are immutable once built: the only way to obtain one is through
/// [`Place::new`] (or deserialization, which runs the same checks), so every
/// value in circulation has a non-empty name and description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPlace")]
pub struct Place {
    name: String,
    description: String,
    coordinate: Coordinate,
}

#[derive(Deserialize)]
struct RawPlace {
    name: String,
    description: String,
    coordinate: Coordinate,
}

impl TryFrom<RawPlace> for Place {
    type Error = PlaceError;

    fn try_from(raw: RawPlace) -> Result<Self, Self::Error> {
        Place::new(raw.name, raw.description, raw.coordinate)
    }
}

impl Place {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        coordinate: Coordinate,
    ) -> Result<Self, PlaceError> {
        let name = name.into();
        let description = description.into();
        if name.is_empty() {
            return Err(PlaceError::EmptyName);
        }
        if description.is_empty() {
            return Err(PlaceError::EmptyDescription);
        }
        Ok(Self {
            name,
            description,
            coordinate,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// The label shown when the marker for this place is opened.
    pub fn popup(&self) -> Popup {
        Popup {
            title: self.name.clone(),
            body: self.description.clone(),
        }
    }
}

/// Label payload bound to a rendered marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub body: String,
}

impl Popup {
    /// Markup for HTML-based surfaces: bold title, line break, body.
    pub fn html(&self) -> String {
        format!(
            "<b>{}</b><br>{}",
            escape_html(&self.title),
            escape_html(&self.body)
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Where the map opens when the device position is unknown.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: -23.5505,
    lon: -46.6333,
};

/// The places shown when nothing has been stored yet.
pub fn seed_places() -> Vec<Place> {
    vec![
        Place {
            name: "Bar do Zé".to_string(),
            description: "Mesa oficial e cerveja gelada.".to_string(),
            coordinate: Coordinate {
                lat: -23.5587,
                lon: -46.6253,
            },
        },
        Place {
            name: "Boteco da Esquina".to_string(),
            description: "Mesa de sinuca e música ao vivo.".to_string(),
            coordinate: Coordinate {
                lat: -23.5432,
                lon: -46.6388,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_rejects_out_of_range() {
        assert_eq!(
            Coordinate::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(-180.5))
        );
        assert_eq!(
            Coordinate::new(f64::NAN, 0.0),
            Err(CoordinateError::NotFinite)
        );
    }

    #[test]
    fn test_coordinate_accepts_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_wrapped_brings_longitude_back_into_range() {
        let c = Coordinate::wrapped(10.0, 190.0).unwrap();
        assert!((c.lon() - -170.0).abs() < 1e-9);

        let c = Coordinate::wrapped(10.0, -540.0).unwrap();
        assert!((c.lon() - -180.0).abs() < 1e-9);

        assert_eq!(
            Coordinate::wrapped(95.0, 10.0),
            Err(CoordinateError::LatitudeOutOfRange(95.0))
        );
    }

    #[test]
    fn test_place_json_layout() {
        let place = Place::new("X", "Y", Coordinate::new(-23.5, -46.6).unwrap()).unwrap();
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "X",
                "description": "Y",
                "coordinate": [-23.5, -46.6]
            })
        );
    }

    #[test]
    fn test_place_deserialize_checks_invariants() {
        let empty_name = r#"{"name":"","description":"d","coordinate":[0,0]}"#;
        assert!(serde_json::from_str::<Place>(empty_name).is_err());

        let bad_lat = r#"{"name":"n","description":"d","coordinate":[120,0]}"#;
        assert!(serde_json::from_str::<Place>(bad_lat).is_err());

        let missing = r#"{"name":"n","coordinate":[0,0]}"#;
        assert!(serde_json::from_str::<Place>(missing).is_err());
    }

    #[test]
    fn test_popup_html_escapes_markup() {
        let place = Place::new(
            "<script>",
            "Tom & Jerry",
            Coordinate::new(0.0, 0.0).unwrap(),
        )
        .unwrap();
        assert_eq!(
            place.popup().html(),
            "<b>&lt;script&gt;</b><br>Tom &amp; Jerry"
        );
    }

    #[test]
    fn test_seed_places_are_valid() {
        for place in seed_places() {
            let json = serde_json::to_string(&place).unwrap();
            let back: Place = serde_json::from_str(&json).unwrap();
            assert_eq!(back, place);
        }
    }
}
