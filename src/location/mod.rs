//! Address resolution subsystem.
//!
//! Turns a free-text street address into a validated coordinate through a
//! pluggable geocoding provider.

pub mod providers;
pub mod resolver;
pub mod types;

pub use providers::{Geocoder, GoogleGeocoder, NominatimGeocoder};
pub use resolver::AddressResolver;
pub use types::{Coordinate, CoordinateError, GeocodeCandidate, GeocodeError, ResolutionFailure};
