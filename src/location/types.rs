//! Core types for the address resolution subsystem.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A validated latitude/longitude pair.
///
/// Only produced by [`Coordinate::new`], so every value in circulation is
/// finite and inside the WGS84 ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::Longitude(lon));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.6}\u{00B0}{}, {:.6}\u{00B0}{}", self.lat.abs(), ns, self.lon.abs(), ew)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("coordinates must be finite numbers")]
    NotFinite,
    #[error("latitude {0} is outside -90..90")]
    Latitude(f64),
    #[error("longitude {0} is outside -180..180")]
    Longitude(f64),
}

/// One location returned by a geocoding provider, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub lat: f64,
    pub lon: f64,
    /// Provider's formatted address, when it reports one.
    pub formatted_address: Option<String>,
}

/// Failures raised by a geocoding provider.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("network error: {0}")]
    Network(String),
    /// The provider answered but refused the request (bad key, quota, denied).
    #[error("provider rejected request: {0}")]
    Rejected(String),
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// The address could not be turned into a trustworthy coordinate.
///
/// Zero candidates and provider errors deliberately collapse into this one
/// kind; the cause is logged by the resolver, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address could not be resolved")]
pub struct ResolutionFailure;
