//! Geocoding providers: Google Maps and OpenStreetMap Nominatim.

use super::types::{GeocodeCandidate, GeocodeError};
use serde::Deserialize;

/// The external geocoding capability.
///
/// Candidates come back in provider order; an empty list means the provider
/// knows no location for the address.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError>;

    /// Short provider name for log lines.
    fn name(&self) -> &'static str;
}

const USER_AGENT: &str = concat!("MccCarpools/", env!("CARGO_PKG_VERSION"), " (carpool-coordinator)");

fn transport_error(e: ureq::Error) -> GeocodeError {
    match e {
        ureq::Error::Status(code, response) => GeocodeError::Rejected(format!(
            "HTTP {} {}",
            code,
            response.status_text()
        )),
        ureq::Error::Transport(t) => GeocodeError::Network(t.to_string()),
    }
}

// ─── Google Maps Geocoding API ──────────────────────────────────

pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Deserialize, Debug)]
struct GoogleResponse {
    status: String,
    /// Left undecoded; only the first entry is ever read.
    #[serde(default)]
    results: Vec<serde_json::Value>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GoogleResult {
    geometry: GoogleGeometry,
    #[serde(default)]
    formatted_address: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GoogleGeometry {
    location: GoogleLatLng,
}

#[derive(Deserialize, Debug)]
struct GoogleLatLng {
    lat: f64,
    lng: f64,
}

/// Geocoder backed by the Google Maps Geocoding API.
pub struct GoogleGeocoder {
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into() }
    }
}

impl Geocoder for GoogleGeocoder {
    fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        let response = ureq::get(GOOGLE_GEOCODE_URL)
            .set("User-Agent", USER_AGENT)
            .query("address", address)
            .query("key", &self.api_key)
            .call()
            .map_err(transport_error)?;

        let body: GoogleResponse = response
            .into_json()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        parse_google(body)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

/// Decode the first result only. Later results are discarded unread.
fn parse_google(body: GoogleResponse) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
    match body.status.as_str() {
        "OK" => {
            let Some(first) = body.results.into_iter().next() else {
                return Ok(Vec::new());
            };
            let r: GoogleResult = serde_json::from_value(first)
                .map_err(|e| GeocodeError::InvalidResponse(format!("first result: {}", e)))?;
            Ok(vec![GeocodeCandidate {
                lat: r.geometry.location.lat,
                lon: r.geometry.location.lng,
                formatted_address: r.formatted_address,
            }])
        }
        "ZERO_RESULTS" => Ok(Vec::new()),
        other => {
            let detail = match body.error_message {
                Some(msg) => format!("{}: {}", other, msg),
                None => other.to_string(),
            };
            Err(GeocodeError::Rejected(detail))
        }
    }
}

// ─── Nominatim provider ─────────────────────────────────────────

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Deserialize, Debug)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Keyless geocoder backed by OpenStreetMap Nominatim.
#[derive(Default)]
pub struct NominatimGeocoder;

impl NominatimGeocoder {
    pub fn new() -> Self {
        Self
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        let response = ureq::get(NOMINATIM_SEARCH_URL)
            .set("User-Agent", USER_AGENT)
            .query("q", address)
            .query("format", "json")
            .query("limit", "1")
            .query("addressdetails", "0")
            .call()
            .map_err(transport_error)?;

        let results: Vec<serde_json::Value> = response
            .into_json()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        parse_nominatim(results)
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

/// Decode the first result only. Later results are discarded unread.
fn parse_nominatim(results: Vec<serde_json::Value>) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
    let Some(first) = results.into_iter().next() else {
        return Ok(Vec::new());
    };
    let r: NominatimResult = serde_json::from_value(first)
        .map_err(|e| GeocodeError::InvalidResponse(format!("first result: {}", e)))?;

    let lat = r.lat.trim().parse::<f64>().map_err(|e| {
        GeocodeError::InvalidResponse(format!("bad latitude '{}': {}", r.lat, e))
    })?;
    let lon = r.lon.trim().parse::<f64>().map_err(|e| {
        GeocodeError::InvalidResponse(format!("bad longitude '{}': {}", r.lon, e))
    })?;
    Ok(vec![GeocodeCandidate {
        lat,
        lon,
        formatted_address: r.display_name,
    }])
}
