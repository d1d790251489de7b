//! Place model for geographic coordinates and place identity

use serde::{Deserialize, Serialize};

/// Geographic coordinate pair
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl Coordinate {
    /// Create a new coordinate pair
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Squared lat/lon delta to another coordinate.
    ///
    /// This is the catalog matching metric, not a geodesic distance.
    #[must_use]
    pub fn squared_distance(&self, other: &Coordinate) -> f64 {
        let d_lat = self.lat - other.lat;
        let d_lon = self.lon - other.lon;
        d_lat * d_lat + d_lon * d_lon
    }

    /// Format as a coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// A named place the dashboard can show weather for.
///
/// Identified by `(name, country)`; instances are replaced wholesale,
/// never mutated in place.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Place {
    /// Display name (city)
    pub name: String,
    /// Country name or code
    pub country: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl Place {
    /// Create a new place
    #[must_use]
    pub fn new<S: Into<String>>(name: S, country: S, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            lat,
            lon,
        }
    }

    /// Coordinate pair of this place
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    /// Format as "City, Country", falling back to the bare name
    #[must_use]
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Result of a reverse geocode lookup.
///
/// Both fields are empty strings when the lookup failed; reverse
/// geocoding is best-effort and never propagates an error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ResolvedName {
    /// City or locality name
    pub city: String,
    /// Country name
    pub country: String,
}

impl ResolvedName {
    /// True when the lookup produced no usable name
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.city.is_empty() && self.country.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_distance() {
        let a = Coordinate::new(40.7128, -74.0060);
        let b = Coordinate::new(40.7128, -74.0060);
        assert_eq!(a.squared_distance(&b), 0.0);

        let c = Coordinate::new(41.7128, -73.0060);
        assert!((a.squared_distance(&c) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_place_label() {
        let place = Place::new("New York", "US", 40.7128, -74.0060);
        assert_eq!(place.label(), "New York, US");

        let bare = Place::new("Atlantis", "", 0.0, 0.0);
        assert_eq!(bare.label(), "Atlantis");
    }

    #[test]
    fn test_resolved_name_empty() {
        let empty = ResolvedName::default();
        assert!(empty.is_empty());

        let named = ResolvedName {
            city: "Colombo".to_string(),
            country: "Sri Lanka".to_string(),
        };
        assert!(!named.is_empty());
    }
}
