//! Error types and handling for the `Skycast` dashboard core

use thiserror::Error;

/// Main error type for the `Skycast` dashboard core
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Geolocation lookup errors, absorbed by the location fallback chain
    #[error("Geolocation unavailable: {message}")]
    Geolocation { message: String },

    /// Network or upstream transport errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Structurally incomplete or undecodable upstream responses
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DashboardError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new geolocation error
    pub fn geolocation<S: Into<String>>(message: S) -> Self {
        Self::Geolocation {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            DashboardError::Geolocation { .. } => {
                "Could not determine your location. Showing the default city.".to_string()
            }
            DashboardError::Network { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            DashboardError::MalformedResponse { .. } => {
                "The weather service returned an incomplete response. Please try again later."
                    .to_string()
            }
            DashboardError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = DashboardError::config("missing refresh interval");
        assert!(matches!(config_err, DashboardError::Config { .. }));

        let network_err = DashboardError::network("connection refused");
        assert!(matches!(network_err, DashboardError::Network { .. }));

        let malformed_err = DashboardError::malformed("missing hourly block");
        assert!(matches!(
            malformed_err,
            DashboardError::MalformedResponse { .. }
        ));
    }

    #[test]
    fn test_user_messages() {
        let network_err = DashboardError::network("test");
        assert!(network_err.user_message().contains("Unable to reach"));

        let geo_err = DashboardError::geolocation("test");
        assert!(geo_err.user_message().contains("default city"));

        let malformed_err = DashboardError::malformed("test");
        assert!(malformed_err.user_message().contains("incomplete"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let dash_err: DashboardError = io_err.into();
        assert!(matches!(dash_err, DashboardError::Io { .. }));
    }
}
