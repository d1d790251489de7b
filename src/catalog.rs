//! Static city catalog and nearest-match lookup
//!
//! The catalog backs the last resort tiers of location resolution and the
//! local city picker. Entries are ordered; nearest-match ties resolve to
//! the earliest entry.

use crate::models::{Coordinate, Place};

struct CatalogEntry {
    name: &'static str,
    country: &'static str,
    lat: f64,
    lon: f64,
}

impl CatalogEntry {
    fn to_place(&self) -> Place {
        Place::new(self.name, self.country, self.lat, self.lon)
    }
}

const CITIES: &[CatalogEntry] = &[
    CatalogEntry { name: "New York", country: "United States", lat: 40.7128, lon: -74.0060 },
    CatalogEntry { name: "Los Angeles", country: "United States", lat: 34.0522, lon: -118.2437 },
    CatalogEntry { name: "Toronto", country: "Canada", lat: 43.6532, lon: -79.3832 },
    CatalogEntry { name: "Mexico City", country: "Mexico", lat: 19.4326, lon: -99.1332 },
    CatalogEntry { name: "Sao Paulo", country: "Brazil", lat: -23.5505, lon: -46.6333 },
    CatalogEntry { name: "London", country: "United Kingdom", lat: 51.5074, lon: -0.1278 },
    CatalogEntry { name: "Paris", country: "France", lat: 48.8566, lon: 2.3522 },
    CatalogEntry { name: "Berlin", country: "Germany", lat: 52.5200, lon: 13.4050 },
    CatalogEntry { name: "Madrid", country: "Spain", lat: 40.4168, lon: -3.7038 },
    CatalogEntry { name: "Rome", country: "Italy", lat: 41.9028, lon: 12.4964 },
    CatalogEntry { name: "Moscow", country: "Russia", lat: 55.7558, lon: 37.6173 },
    CatalogEntry { name: "Cairo", country: "Egypt", lat: 30.0444, lon: 31.2357 },
    CatalogEntry { name: "Lagos", country: "Nigeria", lat: 6.5244, lon: 3.3792 },
    CatalogEntry { name: "Dubai", country: "United Arab Emirates", lat: 25.2048, lon: 55.2708 },
    CatalogEntry { name: "Mumbai", country: "India", lat: 19.0760, lon: 72.8777 },
    CatalogEntry { name: "Colombo", country: "Sri Lanka", lat: 6.9271, lon: 79.8612 },
    CatalogEntry { name: "Singapore", country: "Singapore", lat: 1.3521, lon: 103.8198 },
    CatalogEntry { name: "Beijing", country: "China", lat: 39.9042, lon: 116.4074 },
    CatalogEntry { name: "Tokyo", country: "Japan", lat: 35.6762, lon: 139.6503 },
    CatalogEntry { name: "Sydney", country: "Australia", lat: -33.8688, lon: 151.2093 },
];

const DEFAULT_CITY_NAME: &str = "New York";

/// The fallback place when no location can be determined
#[must_use]
pub fn default_place() -> Place {
    CITIES
        .iter()
        .find(|city| city.name == DEFAULT_CITY_NAME)
        .unwrap_or(&CITIES[0])
        .to_place()
}

/// Nearest catalog city to a coordinate by squared lat/lon delta
#[must_use]
pub fn nearest_city(coord: &Coordinate) -> Place {
    nearest_in(CITIES, coord).to_place()
}

fn nearest_in<'a>(entries: &'a [CatalogEntry], coord: &Coordinate) -> &'a CatalogEntry {
    let mut nearest = &entries[0];
    let mut min_dist = f64::INFINITY;
    for entry in entries {
        let dist = Coordinate::new(entry.lat, entry.lon).squared_distance(coord);
        if dist < min_dist {
            min_dist = dist;
            nearest = entry;
        }
    }
    nearest
}

/// Case-insensitive substring filter over city name and country.
///
/// A blank query returns the whole catalog in order.
#[must_use]
pub fn filter(query: &str) -> Vec<Place> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return all_cities();
    }
    let needle = trimmed.to_lowercase();
    CITIES
        .iter()
        .filter(|city| {
            city.name.to_lowercase().contains(&needle)
                || city.country.to_lowercase().contains(&needle)
        })
        .map(CatalogEntry::to_place)
        .collect()
}

/// All catalog cities in order
#[must_use]
pub fn all_cities() -> Vec<Place> {
    CITIES.iter().map(CatalogEntry::to_place).collect()
}
