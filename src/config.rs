//! Runtime configuration from `.env` and the process environment.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::JsonFileStore;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Which geocoding provider resolves addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocoderKind {
    Google,
    Nominatim,
}

impl std::str::FromStr for GeocoderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "nominatim" | "osm" => Ok(Self::Nominatim),
            other => Err(ConfigError::Invalid {
                key: "CARPOOLS_GEOCODER",
                value: other.to_string(),
                reason: "expected 'google' or 'nominatim'".into(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} is required when the Google geocoder is selected")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub geocoder: GeocoderKind,
    pub google_api_key: Option<String>,
    pub store_path: PathBuf,
    pub log_filter: String,
}

impl AppConfig {
    /// Load `.env` (if present), then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("CARPOOLS_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "CARPOOLS_PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let google_api_key = get("GOOGLE_MAPS_API_KEY");
        let geocoder = match get("CARPOOLS_GEOCODER") {
            Some(raw) => raw.parse()?,
            None if google_api_key.is_some() => GeocoderKind::Google,
            None => GeocoderKind::Nominatim,
        };
        if geocoder == GeocoderKind::Google && google_api_key.is_none() {
            return Err(ConfigError::Missing("GOOGLE_MAPS_API_KEY"));
        }

        Ok(Self {
            host: get("CARPOOLS_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            geocoder,
            google_api_key,
            store_path: get("CARPOOLS_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(JsonFileStore::default_path),
            log_filter: get("CARPOOLS_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}
