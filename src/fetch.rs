//! Forecast and air quality fetching with snapshot normalization
//!
//! One fetch produces one immutable [`WeatherSnapshot`]. The fetcher never
//! retries; the refresh cadence upstream decides when to try again.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use futures::future;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::models::{
    AirQuality, Coordinate, CurrentConditions, DailyEntry, HourlyEntry, Place, WeatherSnapshot,
};

/// Number of hourly entries a snapshot keeps
const HOURLY_WINDOW: usize = 24;

/// Source of weather snapshots for a place.
///
/// The view synchronizer only sees this trait, so fetching can be
/// scripted in tests.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch a snapshot and best-effort air quality for a place
    async fn fetch(&self, place: &Place) -> Result<(WeatherSnapshot, Option<AirQuality>)>;
}

/// Client for the forecast and air quality APIs
pub struct WeatherClient {
    client: Client,
    forecast_base_url: String,
    air_quality_base_url: String,
    forecast_days: u32,
    include_air_quality: bool,
}

impl WeatherClient {
    /// Create a new client
    pub fn new(config: &DashboardConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.network.timeout_seconds)))
            .user_agent("Skycast/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            forecast_base_url: config.network.forecast_base_url.clone(),
            air_quality_base_url: config.network.air_quality_base_url.clone(),
            forecast_days: config.refresh.forecast_days,
            include_air_quality: config.refresh.include_air_quality,
        }
    }

    /// Fetch and normalize the forecast for a coordinate, with air quality
    /// alongside when enabled.
    ///
    /// Air quality is strictly best-effort: its failure is logged and
    /// reported as absence, never as a fetch failure.
    pub async fn fetch_snapshot(
        &self,
        coord: &Coordinate,
    ) -> Result<(WeatherSnapshot, Option<AirQuality>)> {
        info!("Fetching forecast for {}", coord.format_coordinates());

        if !self.include_air_quality {
            let snapshot = self.fetch_forecast(coord).await?;
            return Ok((snapshot, None));
        }

        let (forecast, air) =
            future::join(self.fetch_forecast(coord), self.fetch_air_quality(coord)).await;

        let snapshot = forecast?;
        let air_quality = match air {
            Ok(aq) => Some(aq),
            Err(e) => {
                warn!("Air quality lookup failed: {}", e);
                None
            }
        };

        Ok((snapshot, air_quality))
    }

    async fn fetch_forecast(&self, coord: &Coordinate) -> Result<WeatherSnapshot> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,apparent_temperature,is_day,precipitation,weathercode,cloud_cover,surface_pressure,windspeed_10m,winddirection_10m,uv_index&hourly=temperature_2m,weathercode,precipitation_probability,windspeed_10m,relative_humidity_2m&daily=weathercode,temperature_2m_max,temperature_2m_min,sunrise,sunset,precipitation_sum,precipitation_probability_max,windspeed_10m_max,uv_index_max&timezone=auto&forecast_days={}",
            self.forecast_base_url, coord.lat, coord.lon, self.forecast_days
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DashboardError::network(format!("Forecast request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DashboardError::network(format!(
                "Forecast API returned status {}",
                response.status()
            )));
        }

        let forecast_response: openmeteo::ForecastResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::malformed(format!("Failed to parse forecast response: {e}")))?;

        let snapshot = build_snapshot(forecast_response, Utc::now())?;
        debug!(
            "Normalized snapshot: {} hourly entries, {} days",
            snapshot.hourly.len(),
            snapshot.daily.len()
        );
        Ok(snapshot)
    }

    async fn fetch_air_quality(&self, coord: &Coordinate) -> Result<AirQuality> {
        let url = format!(
            "{}/air-quality?latitude={}&longitude={}&current=european_aqi,pm2_5,pm10",
            self.air_quality_base_url, coord.lat, coord.lon
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DashboardError::network(format!("Air quality request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DashboardError::network(format!(
                "Air quality API returned status {}",
                response.status()
            )));
        }

        let payload: openmeteo::AirQualityResponse = response
            .json()
            .await
            .map_err(|e| {
                DashboardError::malformed(format!("Failed to parse air quality response: {e}"))
            })?;

        let current = payload
            .current
            .ok_or_else(|| DashboardError::malformed("Air quality response missing current block"))?;

        Ok(AirQuality {
            european_aqi: current.european_aqi,
            pm2_5: current.pm2_5,
            pm10: current.pm10,
        })
    }
}

#[async_trait]
impl SnapshotSource for WeatherClient {
    async fn fetch(&self, place: &Place) -> Result<(WeatherSnapshot, Option<AirQuality>)> {
        self.fetch_snapshot(&place.coordinate()).await
    }
}

/// Normalize an upstream response into a snapshot.
///
/// `now_utc` anchors the hourly window and the day/night fallback, so
/// normalization stays reproducible for a fixed response and clock.
fn build_snapshot(
    response: openmeteo::ForecastResponse,
    now_utc: DateTime<Utc>,
) -> Result<WeatherSnapshot> {
    let current = response
        .current
        .ok_or_else(|| DashboardError::malformed("Forecast response missing current block"))?;
    let hourly = response
        .hourly
        .ok_or_else(|| DashboardError::malformed("Forecast response missing hourly block"))?;
    let daily = response
        .daily
        .ok_or_else(|| DashboardError::malformed("Forecast response missing daily block"))?;

    let offset = FixedOffset::east_opt(response.utc_offset_seconds).ok_or_else(|| {
        DashboardError::malformed(format!(
            "Implausible UTC offset: {}",
            response.utc_offset_seconds
        ))
    })?;
    let local_now = now_utc.with_timezone(&offset).naive_local();

    let daily_entries = build_daily(&daily)?;
    let hourly_entries = build_hourly(&hourly, local_now)?;

    // The upstream omits is_day for some archival queries; today's
    // sunrise/sunset window stands in for it then.
    let is_day = match current.is_day {
        Some(flag) => flag == 1,
        None => match daily_entries.first() {
            Some(today) => today.sunrise <= local_now && local_now <= today.sunset,
            None => true,
        },
    };

    let current = CurrentConditions {
        temperature_c: current.temperature.round() as i32,
        feels_like_c: current.feels_like.round() as i32,
        humidity_pct: current.humidity,
        wind_speed_kmh: current.wind_speed.round() as i32,
        wind_direction_deg: current.wind_direction,
        weather_code: current.weather_code,
        is_day,
        cloud_cover_pct: current.cloud_cover,
        pressure_hpa: current.pressure,
        precipitation_mm: current.precipitation,
        uv_index: current.uv_index,
    };

    Ok(WeatherSnapshot {
        current,
        hourly: hourly_entries,
        daily: daily_entries,
        timezone: response.timezone,
        utc_offset_seconds: response.utc_offset_seconds,
    })
}

/// Build the hourly window: entries from the first timestamp at or after
/// local now (clamped to the series start), at most [`HOURLY_WINDOW`] long.
fn build_hourly(
    hourly: &openmeteo::HourlyData,
    local_now: NaiveDateTime,
) -> Result<Vec<HourlyEntry>> {
    if hourly.time.is_empty() {
        return Err(DashboardError::malformed("Hourly series is empty"));
    }

    let mut entries = Vec::with_capacity(hourly.time.len());
    for (i, raw_time) in hourly.time.iter().enumerate() {
        let time = parse_local_time(raw_time)?;
        entries.push(HourlyEntry {
            time,
            temperature_c: series_value(&hourly.temperature, i, 0.0),
            weather_code: series_value(&hourly.weather_code, i, 0),
            precip_probability_pct: series_value(&hourly.precip_probability, i, 0),
            wind_speed_kmh: series_value(&hourly.wind_speed, i, 0.0),
            humidity_pct: series_value(&hourly.humidity, i, 0),
        });
    }

    let start = entries
        .iter()
        .position(|entry| entry.time >= local_now)
        .unwrap_or(0);

    Ok(entries
        .into_iter()
        .skip(start)
        .take(HOURLY_WINDOW)
        .collect())
}

fn build_daily(daily: &openmeteo::DailyData) -> Result<Vec<DailyEntry>> {
    if daily.time.is_empty() {
        return Err(DashboardError::malformed("Daily series is empty"));
    }

    let mut entries = Vec::with_capacity(daily.time.len());
    for (i, raw_date) in daily.time.iter().enumerate() {
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|e| DashboardError::malformed(format!("Unparseable daily date '{raw_date}': {e}")))?;

        let sunrise = daily
            .sunrise
            .get(i)
            .map(|s| parse_local_time(s))
            .transpose()?
            .ok_or_else(|| DashboardError::malformed("Daily series missing sunrise"))?;
        let sunset = daily
            .sunset
            .get(i)
            .map(|s| parse_local_time(s))
            .transpose()?
            .ok_or_else(|| DashboardError::malformed("Daily series missing sunset"))?;

        entries.push(DailyEntry {
            date,
            weather_code: series_value(&daily.weather_code, i, 0),
            temp_max_c: series_value(&daily.temperature_max, i, 0.0).round() as i32,
            temp_min_c: series_value(&daily.temperature_min, i, 0.0).round() as i32,
            sunrise,
            sunset,
            precip_sum_mm: series_value(&daily.precipitation_sum, i, 0.0),
            precip_prob_max_pct: series_value(&daily.precip_prob_max, i, 0),
            wind_max_kmh: series_value(&daily.wind_speed_max, i, 0.0),
            uv_index_max: series_value(&daily.uv_index_max, i, 0.0),
        });
    }

    Ok(entries)
}

/// Value of a parallel series at an index, with a default for short
/// series and null entries
fn series_value<T: Copy>(series: &[Option<T>], index: usize, default: T) -> T {
    series.get(index).copied().flatten().unwrap_or(default)
}

/// Parse an upstream local timestamp ("2024-06-10T14:00")
fn parse_local_time(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| DashboardError::malformed(format!("Unparseable timestamp '{raw}': {e}")))
}

/// Upstream API response structures
mod openmeteo {
    use serde::Deserialize;

    /// Forecast response with parallel hourly and daily series
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub timezone: String,
        pub utc_offset_seconds: i32,
        pub current: Option<CurrentData>,
        pub hourly: Option<HourlyData>,
        pub daily: Option<DailyData>,
    }

    /// Current conditions block
    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        #[serde(rename = "temperature_2m")]
        pub temperature: f64,
        #[serde(rename = "relative_humidity_2m")]
        pub humidity: u8,
        #[serde(rename = "apparent_temperature")]
        pub feels_like: f64,
        pub is_day: Option<u8>,
        pub precipitation: f64,
        #[serde(rename = "weathercode")]
        pub weather_code: u16,
        pub cloud_cover: u8,
        #[serde(rename = "surface_pressure")]
        pub pressure: f64,
        #[serde(rename = "windspeed_10m")]
        pub wind_speed: f64,
        #[serde(rename = "winddirection_10m")]
        pub wind_direction: u16,
        #[serde(default)]
        pub uv_index: f64,
    }

    /// Hourly series, parallel to `time`
    #[derive(Debug, Deserialize)]
    pub struct HourlyData {
        pub time: Vec<String>,
        #[serde(rename = "temperature_2m", default)]
        pub temperature: Vec<Option<f64>>,
        #[serde(rename = "weathercode", default)]
        pub weather_code: Vec<Option<u16>>,
        #[serde(rename = "precipitation_probability", default)]
        pub precip_probability: Vec<Option<u8>>,
        #[serde(rename = "windspeed_10m", default)]
        pub wind_speed: Vec<Option<f64>>,
        #[serde(rename = "relative_humidity_2m", default)]
        pub humidity: Vec<Option<u8>>,
    }

    /// Daily series, parallel to `time`
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Vec<String>,
        #[serde(rename = "weathercode", default)]
        pub weather_code: Vec<Option<u16>>,
        #[serde(rename = "temperature_2m_max", default)]
        pub temperature_max: Vec<Option<f64>>,
        #[serde(rename = "temperature_2m_min", default)]
        pub temperature_min: Vec<Option<f64>>,
        #[serde(default)]
        pub sunrise: Vec<String>,
        #[serde(default)]
        pub sunset: Vec<String>,
        #[serde(default)]
        pub precipitation_sum: Vec<Option<f64>>,
        #[serde(rename = "precipitation_probability_max", default)]
        pub precip_prob_max: Vec<Option<u8>>,
        #[serde(rename = "windspeed_10m_max", default)]
        pub wind_speed_max: Vec<Option<f64>>,
        #[serde(default)]
        pub uv_index_max: Vec<Option<f64>>,
    }

    /// Air quality response
    #[derive(Debug, Deserialize)]
    pub struct AirQualityResponse {
        pub current: Option<AirQualityCurrent>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AirQualityCurrent {
        pub european_aqi: f64,
        pub pm2_5: f64,
        pub pm10: f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hourly_series(start_hour: u32, hours: usize) -> openmeteo::HourlyData {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let mut time = Vec::new();
        for i in 0..hours {
            let ts = date.and_hms_opt(0, 0, 0).unwrap()
                + chrono::Duration::hours(i64::from(start_hour) + i as i64);
            time.push(ts.format("%Y-%m-%dT%H:%M").to_string());
        }
        openmeteo::HourlyData {
            time,
            temperature: (0..hours).map(|i| Some(15.0 + i as f64 * 0.5)).collect(),
            weather_code: (0..hours).map(|_| Some(2)).collect(),
            precip_probability: (0..hours).map(|_| Some(10)).collect(),
            wind_speed: (0..hours).map(|_| Some(11.3)).collect(),
            humidity: (0..hours).map(|_| Some(58)).collect(),
        }
    }

    fn daily_series(days: usize) -> openmeteo::DailyData {
        let start = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let time: Vec<String> = (0..days)
            .map(|i| (start + chrono::Duration::days(i as i64)).format("%Y-%m-%d").to_string())
            .collect();
        openmeteo::DailyData {
            time: time.clone(),
            weather_code: (0..days).map(|_| Some(1)).collect(),
            temperature_max: (0..days).map(|_| Some(21.6)).collect(),
            temperature_min: (0..days).map(|_| Some(12.4)).collect(),
            sunrise: time.iter().map(|d| format!("{d}T06:00")).collect(),
            sunset: time.iter().map(|d| format!("{d}T20:00")).collect(),
            precipitation_sum: (0..days).map(|_| Some(0.4)).collect(),
            precip_prob_max: (0..days).map(|_| Some(30)).collect(),
            wind_speed_max: (0..days).map(|_| Some(22.1)).collect(),
            uv_index_max: (0..days).map(|_| Some(6.4)).collect(),
        }
    }

    fn sample_current(is_day: Option<u8>) -> openmeteo::CurrentData {
        openmeteo::CurrentData {
            temperature: 18.6,
            humidity: 62,
            feels_like: 17.4,
            is_day,
            precipitation: 0.2,
            weather_code: 61,
            cloud_cover: 75,
            pressure: 1009.8,
            wind_speed: 14.5,
            wind_direction: 225,
            uv_index: 3.1,
        }
    }

    fn sample_response(is_day: Option<u8>) -> openmeteo::ForecastResponse {
        openmeteo::ForecastResponse {
            timezone: "Europe/Berlin".to_string(),
            utc_offset_seconds: 7200,
            current: Some(sample_current(is_day)),
            hourly: Some(hourly_series(0, 48)),
            daily: Some(daily_series(7)),
        }
    }

    // 2024-06-10 14:30 local in a UTC+2 zone
    fn noonish_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_display_fields_are_rounded() {
        let snapshot = build_snapshot(sample_response(Some(1)), noonish_utc()).unwrap();
        assert_eq!(snapshot.current.temperature_c, 19);
        assert_eq!(snapshot.current.feels_like_c, 17);
        assert_eq!(snapshot.current.wind_speed_kmh, 15);
        // Hourly temperature stays raw for charts
        assert!((snapshot.hourly[0].temperature_c.fract()).abs() > 0.0);
        assert_eq!(snapshot.daily[0].temp_max_c, 22);
        assert_eq!(snapshot.daily[0].temp_min_c, 12);
    }

    #[test]
    fn test_hourly_window_starts_at_local_now() {
        let snapshot = build_snapshot(sample_response(Some(1)), noonish_utc()).unwrap();
        // Local now is 14:30; the first entry at or after it is 15:00
        assert_eq!(snapshot.hourly[0].format_hour(), "15:00");
        assert_eq!(snapshot.hourly.len(), HOURLY_WINDOW);
    }

    #[test]
    fn test_hourly_window_clamps_to_series_start() {
        let mut response = sample_response(Some(1));
        response.hourly = Some(hourly_series(16, 8));
        // Local now 14:30 is before the series begins
        let snapshot = build_snapshot(response, noonish_utc()).unwrap();
        assert_eq!(snapshot.hourly[0].format_hour(), "16:00");
        assert_eq!(snapshot.hourly.len(), 8);
    }

    #[test]
    fn test_hourly_window_when_series_is_stale() {
        let mut response = sample_response(Some(1));
        // Whole series earlier the same day, nothing at or after now
        response.hourly = Some(hourly_series(0, 6));
        let snapshot = build_snapshot(response, noonish_utc()).unwrap();
        assert_eq!(snapshot.hourly[0].format_hour(), "00:00");
        assert_eq!(snapshot.hourly.len(), 6);
    }

    #[test]
    fn test_is_day_prefers_upstream_flag() {
        let night_flagged = build_snapshot(sample_response(Some(0)), noonish_utc()).unwrap();
        assert!(!night_flagged.current.is_day);

        let day_flagged = build_snapshot(sample_response(Some(1)), noonish_utc()).unwrap();
        assert!(day_flagged.current.is_day);
    }

    #[test]
    fn test_is_day_falls_back_to_sun_window() {
        // 14:30 local, between 06:00 sunrise and 20:00 sunset
        let daytime = build_snapshot(sample_response(None), noonish_utc()).unwrap();
        assert!(daytime.current.is_day);

        // 22:30 local, after sunset
        let late = Utc.with_ymd_and_hms(2024, 6, 10, 20, 30, 0).unwrap();
        let night = build_snapshot(sample_response(None), late).unwrap();
        assert!(!night.current.is_day);
    }

    #[test]
    fn test_missing_blocks_fail_the_fetch() {
        let mut response = sample_response(Some(1));
        response.hourly = None;
        let err = build_snapshot(response, noonish_utc()).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedResponse { .. }));

        let mut response = sample_response(Some(1));
        response.daily = None;
        assert!(build_snapshot(response, noonish_utc()).is_err());

        let mut response = sample_response(Some(1));
        response.current = None;
        assert!(build_snapshot(response, noonish_utc()).is_err());
    }

    #[test]
    fn test_empty_series_fails_the_fetch() {
        let mut response = sample_response(Some(1));
        response.hourly = Some(openmeteo::HourlyData {
            time: Vec::new(),
            temperature: Vec::new(),
            weather_code: Vec::new(),
            precip_probability: Vec::new(),
            wind_speed: Vec::new(),
            humidity: Vec::new(),
        });
        let err = build_snapshot(response, noonish_utc()).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_forecast_response_contract() {
        let payload = r#"{
            "latitude": 52.52,
            "longitude": 13.41,
            "timezone": "Europe/Berlin",
            "utc_offset_seconds": 7200,
            "current": {
                "time": "2024-06-10T14:15",
                "temperature_2m": 18.6,
                "relative_humidity_2m": 62,
                "apparent_temperature": 17.4,
                "is_day": 1,
                "precipitation": 0.0,
                "weathercode": 3,
                "cloud_cover": 90,
                "surface_pressure": 1011.3,
                "windspeed_10m": 9.8,
                "winddirection_10m": 310
            },
            "hourly": {
                "time": ["2024-06-10T00:00", "2024-06-10T01:00"],
                "temperature_2m": [14.1, 13.8],
                "weathercode": [2, 3],
                "precipitation_probability": [5, null],
                "windspeed_10m": [8.0, 7.5],
                "relative_humidity_2m": [70, 72]
            },
            "daily": {
                "time": ["2024-06-10"],
                "weathercode": [3],
                "temperature_2m_max": [21.0],
                "temperature_2m_min": [12.0],
                "sunrise": ["2024-06-10T04:45"],
                "sunset": ["2024-06-10T21:30"],
                "precipitation_sum": [0.0],
                "precipitation_probability_max": [20],
                "windspeed_10m_max": [18.9],
                "uv_index_max": [5.5]
            }
        }"#;

        let response: openmeteo::ForecastResponse = serde_json::from_str(payload).unwrap();
        let current = response.current.as_ref().unwrap();
        // uv_index was absent and defaults to zero
        assert_eq!(current.uv_index, 0.0);
        assert_eq!(current.weather_code, 3);

        // 21:00 UTC on the 9th is 23:00 local, before the series starts
        let snapshot =
            build_snapshot(response, Utc.with_ymd_and_hms(2024, 6, 9, 21, 0, 0).unwrap()).unwrap();
        assert_eq!(snapshot.current.uv_index, 0.0);
        assert_eq!(snapshot.hourly.len(), 2);
        // Null probability entries normalize to zero
        assert_eq!(snapshot.hourly[1].precip_probability_pct, 0);
        assert_eq!(snapshot.utc_offset_seconds, 7200);
    }

    #[test]
    fn test_parse_air_quality_contract() {
        let payload = r#"{
            "current": {"european_aqi": 32.0, "pm2_5": 8.1, "pm10": 14.9}
        }"#;
        let response: openmeteo::AirQualityResponse = serde_json::from_str(payload).unwrap();
        let current = response.current.unwrap();
        assert_eq!(current.european_aqi, 32.0);

        let empty: openmeteo::AirQualityResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.current.is_none());
    }
}
