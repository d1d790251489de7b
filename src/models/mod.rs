//! Data models for the Skycast dashboard core
//!
//! This module contains the core domain models organized by concern:
//! - Place: Geographic coordinates and place identity
//! - Weather: Normalized forecast snapshot and air quality
//! - State: Observable fetch lifecycle state

pub mod place;
pub mod state;
pub mod weather;

// Re-export all public types for convenient access
pub use place::{Coordinate, Place, ResolvedName};
pub use state::{FetchState, Phase};
pub use weather::{AirQuality, CurrentConditions, DailyEntry, HourlyEntry, WeatherSnapshot};
