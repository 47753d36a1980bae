//! Persistence boundary for driver and rider records.
//!
//! Two backends: an in-memory table set and a JSON file that is rewritten
//! after every insert. Both hold their tables behind one mutex, so the rider
//! name check and the insert it guards are atomic.

pub mod file;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::region::RegionTag;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// A persisted driver. Regions are fixed at creation and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(rename = "region")]
    pub regions: Vec<RegionTag>,
    pub address: String,
    /// Caller's schedule, passed through untouched.
    pub drives: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub availability: serde_json::Value,
    pub divisions: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Driver fields ready for insertion; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewDriver {
    pub name: String,
    pub email: String,
    pub regions: Vec<RegionTag>,
    pub address: String,
    pub drives: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct NewRider {
    pub name: String,
    pub email: String,
    pub availability: serde_json::Value,
    pub divisions: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a rider named '{0}' already exists")]
    DuplicateRider(String),
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Durable home of driver and rider records.
pub trait CarpoolStore: Send + Sync {
    fn insert_driver(&self, driver: NewDriver) -> Result<DriverRecord, StoreError>;

    /// Insert a rider unless one with the same name exists. The check and the
    /// write are a single atomic step.
    fn insert_rider(&self, rider: NewRider) -> Result<RiderRecord, StoreError>;

    fn find_rider_by_name(&self, name: &str) -> Result<Option<RiderRecord>, StoreError>;

    fn list_drivers(&self) -> Result<Vec<DriverRecord>, StoreError>;

    fn list_riders(&self) -> Result<Vec<RiderRecord>, StoreError>;
}

// ─── Shared table logic ─────────────────────────────────────────

/// The tables both backends hold. Serialized as-is by the file store.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    drivers: Vec<DriverRecord>,
    #[serde(default)]
    riders: Vec<RiderRecord>,
}

impl Tables {
    fn next_driver_id(&self) -> u64 {
        self.drivers.iter().map(|d| d.id).max().unwrap_or(0) + 1
    }

    fn next_rider_id(&self) -> u64 {
        self.riders.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    pub(crate) fn insert_driver(&mut self, driver: NewDriver) -> DriverRecord {
        let record = DriverRecord {
            id: self.next_driver_id(),
            name: driver.name,
            email: driver.email,
            regions: driver.regions,
            address: driver.address,
            drives: driver.drives,
            created_at: Utc::now(),
        };
        self.drivers.push(record.clone());
        record
    }

    pub(crate) fn insert_rider(&mut self, rider: NewRider) -> Result<RiderRecord, StoreError> {
        if self.find_rider(&rider.name).is_some() {
            return Err(StoreError::DuplicateRider(rider.name));
        }
        let record = RiderRecord {
            id: self.next_rider_id(),
            name: rider.name,
            email: rider.email,
            availability: rider.availability,
            divisions: rider.divisions,
            created_at: Utc::now(),
        };
        self.riders.push(record.clone());
        Ok(record)
    }

    pub(crate) fn find_rider(&self, name: &str) -> Option<&RiderRecord> {
        self.riders.iter().find(|r| r.name == name)
    }

    pub(crate) fn drivers(&self) -> &[DriverRecord] {
        &self.drivers
    }

    pub(crate) fn riders(&self) -> &[RiderRecord] {
        &self.riders
    }
}
