//! Observable fetch lifecycle state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::place::Place;
use super::weather::{AirQuality, WeatherSnapshot};

/// Lifecycle phase derived from the state fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No fetch started yet
    Idle,
    /// Fetch in flight with nothing to show yet
    Loading,
    /// A snapshot is available (possibly refreshing in the background)
    Ready,
    /// The last fetch failed and there is no snapshot to fall back on
    Failed,
}

/// Everything an observer needs to render the dashboard.
///
/// Updated by a single writer; a prior snapshot stays visible while a
/// background refresh is in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchState {
    /// Place the state refers to
    pub place: Place,
    /// Latest normalized snapshot, if any fetch has succeeded
    pub snapshot: Option<WeatherSnapshot>,
    /// Latest air quality readings, absent when the lookup failed
    pub air_quality: Option<AirQuality>,
    /// Whether a user-visible fetch is in flight
    pub loading: bool,
    /// Message of the most recent failure, cleared on success
    pub error: Option<String>,
    /// When the snapshot was last replaced
    pub last_updated: Option<DateTime<Utc>>,
}

impl FetchState {
    /// State before any fetch has started
    #[must_use]
    pub fn idle(place: Place) -> Self {
        Self {
            place,
            snapshot: None,
            air_quality: None,
            loading: false,
            error: None,
            last_updated: None,
        }
    }

    /// Current lifecycle phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.snapshot.is_some() {
            Phase::Ready
        } else if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else {
            Phase::Idle
        }
    }

    /// True while a background refresh runs behind an existing snapshot
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.loading && self.snapshot.is_some()
    }

    /// Error to surface to the user.
    ///
    /// Failures behind an existing snapshot are log-only; the stale
    /// snapshot keeps rendering instead.
    #[must_use]
    pub fn user_visible_error(&self) -> Option<&str> {
        if self.snapshot.is_some() {
            None
        } else {
            self.error.as_deref()
        }
    }
}
