use std::env::VarError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Client configuration, read from the environment.
///
/// Environment variables (a `.env` file is loaded first if present):
/// - SENSOR_API_BASE_URL: address of the sensor backend, without a
///   trailing slash (default http://localhost:8000)
/// - SENSOR_LOG: tracing filter used when RUST_LOG is unset (default info)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub log_filter: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} is not valid unicode")]
    NotUnicode(&'static str),
    #[error("base URL must start with http:// or https://, got {0}")]
    InvalidBaseUrl(String),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key))
    }

    fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, VarError>,
    ) -> Result<Self, SettingsError> {
        let var = |key: &'static str, default: &str| match lookup(key) {
            Ok(value) if !value.trim().is_empty() => {
                Ok(value.trim().to_string())
            }
            Ok(_) | Err(VarError::NotPresent) => Ok(default.to_string()),
            Err(VarError::NotUnicode(_)) => Err(SettingsError::NotUnicode(key)),
        };

        let base_url = var("SENSOR_API_BASE_URL", DEFAULT_BASE_URL)?;

        Ok(Settings {
            base_url: validate_base_url(&base_url)?,
            log_filter: var("SENSOR_LOG", DEFAULT_LOG_FILTER)?,
        })
    }
}

/// Check that a base address is usable, returning it trimmed.
pub fn validate_base_url(base_url: &str) -> Result<String, SettingsError> {
    let base_url = base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(SettingsError::InvalidBaseUrl(base_url.to_string()));
    }
    Ok(base_url.to_string())
}
