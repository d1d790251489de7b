//! `Skycast` - Live weather dashboard core
//!
//! This library provides the core functionality for resolving a viewing
//! location, fetching and normalizing weather snapshots, and keeping an
//! observable dashboard state fresh in the background.

pub mod catalog;
pub mod codes;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod locate;
pub mod models;
pub mod sync;
pub mod timer;

// Re-export core types for public API
pub use config::DashboardConfig;
pub use error::DashboardError;
pub use fetch::{SnapshotSource, WeatherClient};
pub use geocode::GeocodeClient;
pub use locate::{DeviceLocator, LocationResolver, NoDeviceLocation};
pub use models::{
    AirQuality, Coordinate, CurrentConditions, DailyEntry, FetchState, HourlyEntry, Phase, Place,
    ResolvedName, WeatherSnapshot,
};
pub use sync::ViewSynchronizer;
pub use timer::{Debouncer, RefreshTimer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
