use std::path::PathBuf;
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum TariffError {
    /// Invalid user input (month or summer start out of range)
    #[error("Invalid input: {0}")]
    Validation(String),
    /// Schedule lookup found no matching summer group or month
    #[error("Not found: {0}")]
    NotFound(String),
    /// Live extraction from the tariff portal failed
    #[error("Extraction error: {0}")]
    Extraction(String),
    /// Stored schedule document is malformed
    #[error("Format error: {0}")]
    Format(String),
    /// Configuration file could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
    /// Reading or writing a schedule document failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TariffError {
    /// Short machine-readable name, used as a structured logging field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Extraction(_) => "extraction",
            Self::Format(_) => "format",
            Self::Config(_) => "config",
            Self::Io { .. } => "io",
        }
    }
}

// Portal failures of any kind surface as extraction errors
impl From<reqwest::Error> for TariffError {
    fn from(err: reqwest::Error) -> Self {
        Self::Extraction(format!("HTTP request failed: {}", err))
    }
}

impl From<serde_json::Error> for TariffError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for TariffError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = TariffError::NotFound("summer group starting in month 6".to_string());
        assert_eq!(error.to_string(), "Not found: summer group starting in month 6");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(TariffError::Validation("x".to_string()).kind(), "validation");
        assert_eq!(TariffError::Extraction("x".to_string()).kind(), "extraction");
        assert_eq!(TariffError::Format("x".to_string()).kind(), "format");
    }

    #[test]
    fn test_json_error_is_format_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: TariffError = err.into();
        assert!(matches!(error, TariffError::Format(_)));
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let error = TariffError::Io {
            path: PathBuf::from("/tmp/missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(error.to_string().contains("/tmp/missing.json"));
    }
}
