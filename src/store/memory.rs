//! In-memory store. Lost on exit.

use std::sync::{Mutex, MutexGuard};

use super::{
    CarpoolStore, DriverRecord, NewDriver, NewRider, RiderRecord, StoreError, Tables,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl CarpoolStore for MemoryStore {
    fn insert_driver(&self, driver: NewDriver) -> Result<DriverRecord, StoreError> {
        Ok(self.lock()?.insert_driver(driver))
    }

    fn insert_rider(&self, rider: NewRider) -> Result<RiderRecord, StoreError> {
        self.lock()?.insert_rider(rider)
    }

    fn find_rider_by_name(&self, name: &str) -> Result<Option<RiderRecord>, StoreError> {
        Ok(self.lock()?.find_rider(name).cloned())
    }

    fn list_drivers(&self) -> Result<Vec<DriverRecord>, StoreError> {
        Ok(self.lock()?.drivers().to_vec())
    }

    fn list_riders(&self) -> Result<Vec<RiderRecord>, StoreError> {
        Ok(self.lock()?.riders().to_vec())
    }
}
