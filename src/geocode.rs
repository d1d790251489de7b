//! Forward and reverse geocoding against the geocoding API

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::Result;
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::models::{Coordinate, Place, ResolvedName};

/// Minimum query length before the search endpoint is consulted
const MIN_QUERY_CHARS: usize = 2;
/// Maximum number of candidates requested per search
const MAX_RESULTS: u32 = 5;

/// Client for the geocoding API
pub struct GeocodeClient {
    client: Client,
    base_url: String,
}

impl GeocodeClient {
    /// Create a new client
    pub fn new(config: &DashboardConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.network.timeout_seconds)))
            .user_agent("Skycast/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.network.geocoding_base_url.clone(),
        }
    }

    /// Search for places matching a free-text query.
    ///
    /// Queries shorter than two characters return an empty list without
    /// touching the network, and so does a search with no matches.
    pub async fn search(&self, query: &str) -> Result<Vec<Place>> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        debug!("Searching places matching '{}'", trimmed);

        let url = format!(
            "{}/search?name={}&count={}&language=en&format=json",
            self.base_url,
            urlencoding::encode(trimmed),
            MAX_RESULTS
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DashboardError::network(format!("Geocoding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DashboardError::network(format!(
                "Geocoding API returned status {}",
                response.status()
            )));
        }

        let search_response: openmeteo::SearchResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::malformed(format!("Failed to parse geocoding response: {e}")))?;

        let places: Vec<Place> = search_response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(Place::from)
            .collect();

        debug!("Geocoding returned {} candidates", places.len());
        Ok(places)
    }

    /// Reverse geocode a coordinate into city and country names.
    ///
    /// Best-effort: failures are logged and produce empty strings.
    pub async fn reverse(&self, coord: &Coordinate) -> ResolvedName {
        let url = format!(
            "{}/reverse?latitude={}&longitude={}&language=en&format=json",
            self.base_url, coord.lat, coord.lon
        );

        match self.fetch_reverse(&url).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Reverse geocoding failed: {}", e);
                ResolvedName::default()
            }
        }
    }

    async fn fetch_reverse(&self, url: &str) -> Result<ResolvedName> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DashboardError::network(format!("Reverse geocoding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DashboardError::network(format!(
                "Reverse geocoding returned status {}",
                response.status()
            )));
        }

        let payload: openmeteo::SearchResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::malformed(format!("Failed to parse reverse geocoding response: {e}")))?;

        let name = payload
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|result| ResolvedName {
                city: result.name,
                country: result.country.unwrap_or_default(),
            })
            .unwrap_or_default();

        Ok(name)
    }
}

/// Geocoding API response structures
mod openmeteo {
    use serde::Deserialize;

    use crate::models::Place;

    /// Search and reverse lookup response
    #[derive(Debug, Deserialize)]
    pub struct SearchResponse {
        pub results: Option<Vec<SearchResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct SearchResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub country: Option<String>,
    }

    impl From<SearchResult> for Place {
        fn from(result: SearchResult) -> Self {
            Place {
                name: result.name,
                country: result.country.unwrap_or_default(),
                lat: result.latitude,
                lon: result.longitude,
            }
        }
    }
}
