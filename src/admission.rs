//! Admission gates for new drivers and riders.
//!
//! A driver is persisted only after their address resolves and classifies
//! into at least one region. Both failure causes surface as the same
//! `InvalidAddress` so the service-area boundary is not revealed.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::location::AddressResolver;
use crate::region::{self, RegionSet};
use crate::store::{CarpoolStore, DriverRecord, NewDriver, NewRider, RiderRecord, StoreError};

/// Fields of a driver sign-up, already parsed by the routing layer.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverSubmission {
    pub name: String,
    pub email: String,
    pub address: String,
    pub drives: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiderSubmission {
    pub name: String,
    pub email: String,
    pub availability: serde_json::Value,
    pub divisions: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("Invalid address!")]
    InvalidAddress,
    #[error("Rider already exists")]
    DuplicateRider,
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    /// A collaborator failed. Detail is logged, not exposed.
    #[error("Internal error")]
    Internal,
}

impl From<StoreError> for AdmissionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateRider(_) => Self::DuplicateRider,
            other => {
                error!(error = %other, "record store failure");
                Self::Internal
            }
        }
    }
}

/// Reject blank values. The value is returned exactly as submitted.
fn required(value: String, field: &'static str) -> Result<String, AdmissionError> {
    if value.trim().is_empty() {
        return Err(AdmissionError::MissingField(field));
    }
    Ok(value)
}

/// Composes address resolution, classification and persistence.
#[derive(Clone)]
pub struct AdmissionService {
    resolver: AddressResolver,
    store: Arc<dyn CarpoolStore>,
}

impl AdmissionService {
    pub fn new(resolver: AddressResolver, store: Arc<dyn CarpoolStore>) -> Self {
        Self { resolver, store }
    }

    /// Resolve and classify an address without admitting anyone.
    pub fn classify_address(&self, address: &str) -> Result<RegionSet, AdmissionError> {
        let coord = self
            .resolver
            .resolve(address)
            .map_err(|_| AdmissionError::InvalidAddress)?;
        Ok(region::classify(address, coord))
    }

    pub fn admit_driver(&self, submission: DriverSubmission) -> Result<DriverRecord, AdmissionError> {
        let name = required(submission.name, "name")?;
        let email = required(submission.email, "email")?;
        let address = required(submission.address, "address")?;

        let Some(regions) = self.classify_address(&address)?.into_tags() else {
            warn!("driver address outside every region");
            debug!(%address, "unclassified driver address");
            return Err(AdmissionError::InvalidAddress);
        };

        let record = self.store.insert_driver(NewDriver {
            name,
            email,
            regions,
            address,
            drives: submission.drives,
        })?;

        info!(
            id = record.id,
            name = %record.name,
            regions = ?record.regions,
            "driver admitted"
        );
        Ok(record)
    }

    pub fn admit_rider(&self, submission: RiderSubmission) -> Result<RiderRecord, AdmissionError> {
        let name = required(submission.name, "name")?;
        let email = required(submission.email, "email")?;

        let record = self
            .store
            .insert_rider(NewRider {
                name,
                email,
                availability: submission.availability,
                divisions: submission.divisions,
            })
            .map_err(|e| {
                if let StoreError::DuplicateRider(ref name) = e {
                    info!(%name, "rider rejected as duplicate");
                }
                AdmissionError::from(e)
            })?;

        info!(id = record.id, name = %record.name, "rider admitted");
        Ok(record)
    }

    pub fn list_drivers(&self) -> Result<Vec<DriverRecord>, AdmissionError> {
        Ok(self.store.list_drivers()?)
    }

    pub fn list_riders(&self) -> Result<Vec<RiderRecord>, AdmissionError> {
        Ok(self.store.list_riders()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{GeocodeCandidate, GeocodeError, Geocoder};
    use crate::region::RegionTag;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every query with one fixed point, or nothing.
    struct FixedGeocoder {
        point: Option<(f64, f64)>,
        calls: AtomicUsize,
    }

    impl Geocoder for FixedGeocoder {
        fn geocode(&self, _address: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .point
                .map(|(lat, lon)| GeocodeCandidate { lat, lon, formatted_address: None })
                .into_iter()
                .collect())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    /// Store that refuses every write.
    struct BrokenStore;

    impl CarpoolStore for BrokenStore {
        fn insert_driver(&self, _: NewDriver) -> Result<DriverRecord, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
        fn insert_rider(&self, _: NewRider) -> Result<RiderRecord, StoreError> {
            Err(StoreError::Poisoned)
        }
        fn find_rider_by_name(&self, _: &str) -> Result<Option<RiderRecord>, StoreError> {
            Ok(None)
        }
        fn list_drivers(&self) -> Result<Vec<DriverRecord>, StoreError> {
            Ok(Vec::new())
        }
        fn list_riders(&self) -> Result<Vec<RiderRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn service(point: Option<(f64, f64)>) -> (AdmissionService, Arc<FixedGeocoder>, Arc<MemoryStore>) {
        let geocoder = Arc::new(FixedGeocoder { point, calls: AtomicUsize::new(0) });
        let store = Arc::new(MemoryStore::new());
        let svc = AdmissionService::new(AddressResolver::new(geocoder.clone()), store.clone());
        (svc, geocoder, store)
    }

    fn driver(address: &str) -> DriverSubmission {
        DriverSubmission {
            name: "Linus".into(),
            email: "linus@umich.edu".into(),
            address: address.into(),
            drives: json!({ "sunday": ["9:30"] }),
        }
    }

    fn rider(name: &str) -> RiderSubmission {
        RiderSubmission {
            name: name.into(),
            email: "ada@umich.edu".into(),
            availability: json!({ "monday": ["8:00"] }),
            divisions: json!({ "hill": true, "central": false }),
        }
    }

    #[test]
    fn test_admit_driver_in_region() {
        let (svc, _, store) = service(Some((42.2795, -83.74)));
        let record = svc.admit_driver(driver("123 Main")).unwrap();
        assert_eq!(record.regions, vec![RegionTag::Kerrytown, RegionTag::Central]);
        assert_eq!(record.drives, json!({ "sunday": ["9:30"] }));
        assert_eq!(store.list_drivers().unwrap(), vec![record]);
    }

    #[test]
    fn test_admit_driver_pierpont_keyword() {
        let (svc, _, _) = service(Some((42.2917, -83.7169)));
        let record = svc.admit_driver(driver("5 Pierpont Commons")).unwrap();
        assert_eq!(record.regions, vec![RegionTag::Pierpont]);
    }

    #[test]
    fn test_unresolvable_address_no_write() {
        let (svc, geocoder, store) = service(None);
        let err = svc.admit_driver(driver("zzz")).unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidAddress));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert!(store.list_drivers().unwrap().is_empty());
    }

    #[test]
    fn test_out_of_area_same_error_no_write() {
        let (svc, _, store) = service(Some((40.7128, -74.0060)));
        let err = svc.admit_driver(driver("350 5th Ave, New York")).unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidAddress));
        assert_eq!(err.to_string(), "Invalid address!");
        assert!(store.list_drivers().unwrap().is_empty());
    }

    #[test]
    fn test_blank_address_skips_geocoder() {
        let (svc, geocoder, _) = service(Some((42.28, -83.74)));
        let err = svc.admit_driver(driver("   ")).unwrap_err();
        assert!(matches!(err, AdmissionError::MissingField("address")));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_store_failure_is_opaque() {
        let geocoder = Arc::new(FixedGeocoder { point: Some((42.28, -83.74)), calls: AtomicUsize::new(0) });
        let svc = AdmissionService::new(AddressResolver::new(geocoder), Arc::new(BrokenStore));
        let err = svc.admit_driver(driver("123 Main")).unwrap_err();
        assert!(matches!(err, AdmissionError::Internal));
        assert!(!err.to_string().contains("disk full"));
    }

    #[test]
    fn test_duplicate_rider() {
        let (svc, geocoder, store) = service(None);
        let first = svc.admit_rider(rider("Ada Lovelace")).unwrap();
        assert_eq!(first.divisions, json!({ "hill": true, "central": false }));

        let err = svc.admit_rider(rider("Ada Lovelace")).unwrap_err();
        assert!(matches!(err, AdmissionError::DuplicateRider));

        let riders = store.list_riders().unwrap();
        assert_eq!(riders.iter().filter(|r| r.name == "Ada Lovelace").count(), 1);
        // Riders are never geocoded.
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rider_fields_stored_verbatim() {
        let (svc, _, store) = service(None);
        let mut sub = rider("  Ada Lovelace ");
        sub.email = " ada@umich.edu ".into();
        let record = svc.admit_rider(sub).unwrap();
        assert_eq!(record.name, "  Ada Lovelace ");
        assert_eq!(record.email, " ada@umich.edu ");
        assert!(store.find_rider_by_name("  Ada Lovelace ").unwrap().is_some());
        assert!(store.find_rider_by_name("Ada Lovelace").unwrap().is_none());

        // Uniqueness is on the name as submitted.
        svc.admit_rider(rider("Ada Lovelace")).unwrap();
        assert!(matches!(
            svc.admit_rider(rider("  Ada Lovelace ")),
            Err(AdmissionError::DuplicateRider)
        ));
        assert_eq!(store.list_riders().unwrap().len(), 2);
    }

    #[test]
    fn test_driver_fields_stored_verbatim() {
        let (svc, geocoder, store) = service(Some((42.2795, -83.74)));
        let mut sub = driver(" 123 Main\t");
        sub.name = "Linus ".into();
        sub.email = " linus@umich.edu".into();
        let record = svc.admit_driver(sub).unwrap();
        assert_eq!(record.name, "Linus ");
        assert_eq!(record.email, " linus@umich.edu");
        assert_eq!(record.address, " 123 Main\t");
        assert_eq!(store.list_drivers().unwrap(), vec![record]);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rider_missing_email() {
        let (svc, _, _) = service(None);
        let mut sub = rider("Ada");
        sub.email = String::new();
        assert!(matches!(
            svc.admit_rider(sub),
            Err(AdmissionError::MissingField("email"))
        ));
    }

    #[test]
    fn test_classify_address() {
        let (svc, _, _) = service(Some((42.268, -83.728)));
        assert_eq!(
            svc.classify_address("1 Washtenaw").unwrap(),
            RegionSet::Matched(vec![RegionTag::UpperBp])
        );
    }
}
