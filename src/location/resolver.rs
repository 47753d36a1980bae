//! Address resolver: free-text address → coordinate, or a single failure kind.
//!
//! Only the first provider candidate is used. There is no disambiguation and
//! no retry; each call is terminal.

use std::sync::Arc;

use tracing::{debug, warn};

use super::providers::Geocoder;
use super::types::{Coordinate, ResolutionFailure};

/// Resolves addresses through an injected [`Geocoder`].
#[derive(Clone)]
pub struct AddressResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl AddressResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    pub fn provider_name(&self) -> &'static str {
        self.geocoder.name()
    }

    /// Resolve an address to the coordinate of the provider's first candidate.
    ///
    /// The address itself is only logged at debug level.
    pub fn resolve(&self, address: &str) -> Result<Coordinate, ResolutionFailure> {
        let provider = self.geocoder.name();

        let candidates = match self.geocoder.geocode(address) {
            Ok(c) => c,
            Err(e) => {
                warn!(provider, error = %e, "geocoding failed");
                debug!(provider, address, "geocoding failed for address");
                return Err(ResolutionFailure);
            }
        };

        let Some(first) = candidates.into_iter().next() else {
            warn!(provider, "geocoder returned no candidates");
            debug!(provider, address, "no candidates for address");
            return Err(ResolutionFailure);
        };

        match Coordinate::new(first.lat, first.lon) {
            Ok(coord) => {
                debug!(
                    provider,
                    address,
                    matched = first.formatted_address.as_deref().unwrap_or("-"),
                    %coord,
                    "address resolved"
                );
                Ok(coord)
            }
            Err(e) => {
                warn!(provider, error = %e, "geocoder returned an invalid coordinate");
                debug!(provider, address, "invalid coordinate for address");
                Err(ResolutionFailure)
            }
        }
    }
}
