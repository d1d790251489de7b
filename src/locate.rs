//! Location resolution fallback chain
//!
//! Resolution tries, in order: the device's own position, two IP
//! geolocation providers, and finally the catalog default city. Every
//! obtained coordinate is snapped to the nearest catalog city. The chain
//! always produces a place; failures only move it down a tier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::Result;
use crate::catalog;
use crate::config::{DashboardConfig, LocationConfig};
use crate::error::DashboardError;
use crate::models::{Coordinate, Place};

/// Source of the device's own position, when the host has one
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    /// Attempt to read the device position
    async fn locate(&self) -> Result<Coordinate>;
}

/// Locator for hosts without a positioning capability
pub struct NoDeviceLocation;

#[async_trait]
impl DeviceLocator for NoDeviceLocation {
    async fn locate(&self) -> Result<Coordinate> {
        Err(DashboardError::geolocation(
            "Device positioning not available on this host",
        ))
    }
}

/// Service resolving the place to show weather for
pub struct LocationResolver {
    client: Client,
    device: Box<dyn DeviceLocator>,
    location: LocationConfig,
}

impl LocationResolver {
    /// Create a resolver without device positioning
    pub fn new(config: &DashboardConfig) -> Self {
        Self::with_device(config, Box::new(NoDeviceLocation))
    }

    /// Create a resolver with a device position source
    pub fn with_device(config: &DashboardConfig, device: Box<dyn DeviceLocator>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.network.timeout_seconds)))
            .user_agent("Skycast/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            device,
            location: config.location.clone(),
        }
    }

    /// Resolve the place to show. Never fails; the worst outcome is the
    /// catalog default city.
    pub async fn resolve(&self) -> Place {
        if let Some(coord) = self.device_coordinate().await {
            let place = catalog::nearest_city(&coord);
            info!("Resolved location from device position: {}", place.label());
            return place;
        }

        if let Some(coord) = self.ip_coordinate().await {
            let place = catalog::nearest_city(&coord);
            info!("Resolved location from IP geolocation: {}", place.label());
            return place;
        }

        let fallback = catalog::default_place();
        warn!(
            "Location resolution fell through to the default city: {}",
            fallback.label()
        );
        fallback
    }

    async fn device_coordinate(&self) -> Option<Coordinate> {
        let wait = Duration::from_secs(u64::from(self.location.device_timeout_seconds));
        match timeout(wait, self.device.locate()).await {
            Ok(Ok(coord)) => {
                debug!("Device position: {}", coord.format_coordinates());
                Some(coord)
            }
            Ok(Err(e)) => {
                debug!("Device geolocation unavailable: {}", e);
                None
            }
            Err(_) => {
                debug!(
                    "Device geolocation timed out after {}s",
                    self.location.device_timeout_seconds
                );
                None
            }
        }
    }

    async fn ip_coordinate(&self) -> Option<Coordinate> {
        let wait = Duration::from_secs(u64::from(self.location.ip_timeout_seconds));

        match timeout(wait, self.fetch_ip_primary()).await {
            Ok(Ok(coord)) => return Some(coord),
            Ok(Err(e)) => debug!("Primary IP geolocation failed: {}", e),
            Err(_) => debug!(
                "Primary IP geolocation timed out after {}s",
                self.location.ip_timeout_seconds
            ),
        }

        match timeout(wait, self.fetch_ip_secondary()).await {
            Ok(Ok(coord)) => Some(coord),
            Ok(Err(e)) => {
                debug!("Secondary IP geolocation failed: {}", e);
                None
            }
            Err(_) => {
                debug!(
                    "Secondary IP geolocation timed out after {}s",
                    self.location.ip_timeout_seconds
                );
                None
            }
        }
    }

    async fn fetch_ip_primary(&self) -> Result<Coordinate> {
        let response = self
            .client
            .get(&self.location.ip_primary_url)
            .send()
            .await
            .map_err(|e| DashboardError::geolocation(format!("IP lookup failed: {e}")))?;

        let payload: providers::PrimaryGeo = response
            .json()
            .await
            .map_err(|e| DashboardError::geolocation(format!("IP lookup response unreadable: {e}")))?;

        match (payload.latitude, payload.longitude) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(DashboardError::geolocation(
                "IP lookup response carried no coordinates",
            )),
        }
    }

    async fn fetch_ip_secondary(&self) -> Result<Coordinate> {
        let response = self
            .client
            .get(&self.location.ip_secondary_url)
            .send()
            .await
            .map_err(|e| DashboardError::geolocation(format!("Backup IP lookup failed: {e}")))?;

        let payload: providers::SecondaryGeo = response
            .json()
            .await
            .map_err(|e| {
                DashboardError::geolocation(format!("Backup IP lookup response unreadable: {e}"))
            })?;

        match (payload.lat, payload.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(DashboardError::geolocation(
                "Backup IP lookup response carried no coordinates",
            )),
        }
    }
}

/// IP geolocation provider payloads
mod providers {
    use serde::Deserialize;

    /// ipapi.co-shaped payload
    #[derive(Debug, Deserialize)]
    pub struct PrimaryGeo {
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
    }

    /// ip-api.com-shaped payload
    #[derive(Debug, Deserialize)]
    pub struct SecondaryGeo {
        pub lat: Option<f64>,
        pub lon: Option<f64>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDevice {
        coord: Coordinate,
    }

    #[async_trait]
    impl DeviceLocator for FixedDevice {
        async fn locate(&self) -> Result<Coordinate> {
            Ok(self.coord)
        }
    }

    struct StalledDevice;

    #[async_trait]
    impl DeviceLocator for StalledDevice {
        async fn locate(&self) -> Result<Coordinate> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Coordinate::new(0.0, 0.0))
        }
    }

    fn offline_config() -> DashboardConfig {
        let mut config = DashboardConfig::default();
        // Closed loopback port so provider lookups fail fast without
        // leaving the machine
        config.location.ip_primary_url = "http://127.0.0.1:9".to_string();
        config.location.ip_secondary_url = "http://127.0.0.1:9".to_string();
        config.location.device_timeout_seconds = 1;
        config.location.ip_timeout_seconds = 1;
        config
    }

    #[tokio::test]
    async fn test_device_position_snaps_to_nearest_city() {
        let config = offline_config();
        let device = FixedDevice {
            coord: Coordinate::new(35.68, 139.69),
        };
        let resolver = LocationResolver::with_device(&config, Box::new(device));

        let place = resolver.resolve().await;
        assert_eq!(place.name, "Tokyo");
    }

    #[tokio::test]
    async fn test_chain_falls_through_to_default() {
        let config = offline_config();
        let resolver = LocationResolver::new(&config);

        let place = resolver.resolve().await;
        assert_eq!(place.name, "New York");
    }

    #[tokio::test]
    async fn test_stalled_device_is_abandoned() {
        let config = offline_config();
        let resolver = LocationResolver::with_device(&config, Box::new(StalledDevice));

        let place = resolver.resolve().await;
        assert_eq!(place.name, "New York");
    }

    #[test]
    fn test_provider_payload_shapes() {
        let primary: providers::PrimaryGeo =
            serde_json::from_str(r#"{"latitude": 40.71, "longitude": -74.0, "ip": "1.2.3.4"}"#)
                .unwrap();
        assert_eq!(primary.latitude, Some(40.71));

        let secondary: providers::SecondaryGeo =
            serde_json::from_str(r#"{"lat": 51.5, "lon": -0.12}"#).unwrap();
        assert_eq!(secondary.lon, Some(-0.12));

        let empty: providers::SecondaryGeo = serde_json::from_str("{}").unwrap();
        assert!(empty.lat.is_none());
    }
}
