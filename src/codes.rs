//! Weather interpretation code table and display bandings
//!
//! The code table mirrors the WMO interpretation codes published by the
//! forecast upstream. Treat edits here as upstream contract changes, not
//! cosmetic wording tweaks.

/// Icon category for a weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Sun,
    CloudSun,
    Cloud,
    CloudFog,
    CloudDrizzle,
    CloudRain,
    Snowflake,
    CloudLightning,
}

impl IconKind {
    /// Stable identifier for asset lookup
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            IconKind::Sun => "sun",
            IconKind::CloudSun => "cloud-sun",
            IconKind::Cloud => "cloud",
            IconKind::CloudFog => "cloud-fog",
            IconKind::CloudDrizzle => "cloud-drizzle",
            IconKind::CloudRain => "cloud-rain",
            IconKind::Snowflake => "snowflake",
            IconKind::CloudLightning => "cloud-lightning",
        }
    }
}

/// Map a weather code to its description and icon category.
///
/// Unknown codes map to "Unknown" with the default cloud icon.
#[must_use]
pub fn describe(code: u16) -> (&'static str, IconKind) {
    match code {
        0 => ("Clear sky", IconKind::Sun),
        1 => ("Mainly clear", IconKind::Sun),
        2 => ("Partly cloudy", IconKind::CloudSun),
        3 => ("Overcast", IconKind::Cloud),
        45 => ("Foggy", IconKind::CloudFog),
        48 => ("Rime fog", IconKind::CloudFog),
        51 => ("Light drizzle", IconKind::CloudDrizzle),
        53 => ("Moderate drizzle", IconKind::CloudDrizzle),
        55 => ("Dense drizzle", IconKind::CloudDrizzle),
        56 => ("Light freezing drizzle", IconKind::CloudDrizzle),
        57 => ("Dense freezing drizzle", IconKind::CloudDrizzle),
        61 => ("Slight rain", IconKind::CloudRain),
        63 => ("Moderate rain", IconKind::CloudRain),
        65 => ("Heavy rain", IconKind::CloudRain),
        66 => ("Light freezing rain", IconKind::CloudRain),
        67 => ("Heavy freezing rain", IconKind::CloudRain),
        71 => ("Slight snowfall", IconKind::Snowflake),
        73 => ("Moderate snowfall", IconKind::Snowflake),
        75 => ("Heavy snowfall", IconKind::Snowflake),
        77 => ("Snow grains", IconKind::Snowflake),
        80 => ("Slight rain showers", IconKind::CloudRain),
        81 => ("Moderate rain showers", IconKind::CloudRain),
        82 => ("Violent rain showers", IconKind::CloudRain),
        85 => ("Slight snow showers", IconKind::Snowflake),
        86 => ("Heavy snow showers", IconKind::Snowflake),
        95 => ("Thunderstorm", IconKind::CloudLightning),
        96 => ("Thunderstorm with hail", IconKind::CloudLightning),
        99 => ("Thunderstorm with heavy hail", IconKind::CloudLightning),
        _ => ("Unknown", IconKind::Cloud),
    }
}

/// UV index banding label
#[must_use]
pub fn uv_label(uv: f64) -> &'static str {
    if uv <= 2.0 {
        "Low"
    } else if uv <= 5.0 {
        "Moderate"
    } else if uv <= 7.0 {
        "High"
    } else if uv <= 10.0 {
        "Very High"
    } else {
        "Extreme"
    }
}

/// European air quality index banding label
#[must_use]
pub fn aqi_label(aqi: f64) -> &'static str {
    if aqi <= 20.0 {
        "Good"
    } else if aqi <= 40.0 {
        "Fair"
    } else if aqi <= 60.0 {
        "Moderate"
    } else if aqi <= 80.0 {
        "Poor"
    } else {
        "Very Poor"
    }
}

/// Convert wind direction degrees to a 16-point compass label
#[must_use]
pub fn wind_direction_cardinal(degrees: u16) -> &'static str {
    const DIRS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let index = ((f64::from(degrees) / 22.5).round() as usize) % 16;
    DIRS[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "Clear sky", IconKind::Sun)]
    #[case(2, "Partly cloudy", IconKind::CloudSun)]
    #[case(45, "Foggy", IconKind::CloudFog)]
    #[case(55, "Dense drizzle", IconKind::CloudDrizzle)]
    #[case(61, "Slight rain", IconKind::CloudRain)]
    #[case(77, "Snow grains", IconKind::Snowflake)]
    #[case(82, "Violent rain showers", IconKind::CloudRain)]
    #[case(95, "Thunderstorm", IconKind::CloudLightning)]
    #[case(99, "Thunderstorm with heavy hail", IconKind::CloudLightning)]
    fn test_describe_known_codes(
        #[case] code: u16,
        #[case] description: &str,
        #[case] icon: IconKind,
    ) {
        assert_eq!(describe(code), (description, icon));
    }

    #[test]
    fn test_describe_unknown_code() {
        let (description, icon) = describe(200);
        assert_eq!(description, "Unknown");
        assert_eq!(icon, IconKind::Cloud);
        assert_eq!(icon.slug(), "cloud");
    }

    #[rstest]
    #[case(0.0, "Low")]
    #[case(2.0, "Low")]
    #[case(4.9, "Moderate")]
    #[case(6.0, "High")]
    #[case(9.5, "Very High")]
    #[case(11.0, "Extreme")]
    fn test_uv_label_bands(#[case] uv: f64, #[case] expected: &str) {
        assert_eq!(uv_label(uv), expected);
    }

    #[rstest]
    #[case(12.0, "Good")]
    #[case(35.0, "Fair")]
    #[case(60.0, "Moderate")]
    #[case(75.0, "Poor")]
    #[case(120.0, "Very Poor")]
    fn test_aqi_label_bands(#[case] aqi: f64, #[case] expected: &str) {
        assert_eq!(aqi_label(aqi), expected);
    }

    #[test]
    fn test_wind_direction_cardinal() {
        assert_eq!(wind_direction_cardinal(0), "N");
        assert_eq!(wind_direction_cardinal(90), "E");
        assert_eq!(wind_direction_cardinal(180), "S");
        assert_eq!(wind_direction_cardinal(270), "W");
        assert_eq!(wind_direction_cardinal(11), "N");
        assert_eq!(wind_direction_cardinal(12), "NNE");
        assert_eq!(wind_direction_cardinal(360), "N");
    }
}
