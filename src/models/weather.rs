//! Normalized forecast snapshot and air quality models

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Current conditions at the requested place.
///
/// Display-facing readings (temperature, feels-like, wind speed) are
/// already rounded to whole numbers during normalization.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Air temperature in Celsius, rounded
    pub temperature_c: i32,
    /// Apparent temperature in Celsius, rounded
    pub feels_like_c: i32,
    /// Relative humidity percentage (0-100)
    pub humidity_pct: u8,
    /// Wind speed in km/h, rounded
    pub wind_speed_kmh: i32,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction_deg: u16,
    /// WMO weather interpretation code
    pub weather_code: u16,
    /// Whether it is currently daytime at the place
    pub is_day: bool,
    /// Cloud cover percentage (0-100)
    pub cloud_cover_pct: u8,
    /// Surface pressure in hPa
    pub pressure_hpa: f64,
    /// Precipitation in the current period in mm
    pub precipitation_mm: f64,
    /// UV index, 0 when the upstream omits it
    pub uv_index: f64,
}

impl CurrentConditions {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature_c)
    }
}

/// One hour of the forecast.
///
/// Temperature stays unrounded so chart consumers keep full precision.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyEntry {
    /// Local timestamp of this hour
    pub time: NaiveDateTime,
    /// Air temperature in Celsius, raw
    pub temperature_c: f64,
    /// WMO weather interpretation code
    pub weather_code: u16,
    /// Precipitation probability percentage (0-100)
    pub precip_probability_pct: u8,
    /// Wind speed in km/h, raw
    pub wind_speed_kmh: f64,
    /// Relative humidity percentage (0-100)
    pub humidity_pct: u8,
}

impl HourlyEntry {
    /// Format the hour as "HH:MM"
    #[must_use]
    pub fn format_hour(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

/// One day of the forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyEntry {
    /// Local calendar date
    pub date: NaiveDate,
    /// WMO weather interpretation code
    pub weather_code: u16,
    /// Daily maximum temperature in Celsius, rounded
    pub temp_max_c: i32,
    /// Daily minimum temperature in Celsius, rounded
    pub temp_min_c: i32,
    /// Local sunrise time
    pub sunrise: NaiveDateTime,
    /// Local sunset time
    pub sunset: NaiveDateTime,
    /// Total precipitation in mm
    pub precip_sum_mm: f64,
    /// Maximum precipitation probability percentage (0-100)
    pub precip_prob_max_pct: u8,
    /// Maximum wind speed in km/h
    pub wind_max_kmh: f64,
    /// Maximum UV index
    pub uv_index_max: f64,
}

impl DailyEntry {
    /// Relative label for this day: "Today", "Tomorrow" or the short weekday
    #[must_use]
    pub fn day_label(&self, today: NaiveDate) -> String {
        if self.date == today {
            "Today".to_string()
        } else if self.date == today.succ_opt().unwrap_or(today) {
            "Tomorrow".to_string()
        } else {
            self.date.format("%a").to_string()
        }
    }
}

/// Normalized weather snapshot for one place.
///
/// `hourly` and `daily` are never empty: a response missing either block
/// fails the whole fetch instead of producing a partial snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Current conditions
    pub current: CurrentConditions,
    /// Upcoming hours, ascending, at most 24 entries
    pub hourly: Vec<HourlyEntry>,
    /// Forecast days, ascending
    pub daily: Vec<DailyEntry>,
    /// IANA timezone identifier reported by the upstream
    pub timezone: String,
    /// UTC offset of that timezone in seconds
    pub utc_offset_seconds: i32,
}

impl WeatherSnapshot {
    /// Today's forecast entry, when present
    #[must_use]
    pub fn today(&self) -> Option<&DailyEntry> {
        self.daily.first()
    }
}

/// Air quality readings, fetched best-effort alongside the forecast
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct AirQuality {
    /// European air quality index
    pub european_aqi: f64,
    /// Fine particulate matter (2.5 micrometers) in micrograms per cubic meter
    pub pm2_5: f64,
    /// Coarse particulate matter (10 micrometers) in micrograms per cubic meter
    pub pm10: f64,
}
