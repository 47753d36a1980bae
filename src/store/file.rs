//! JSON file store, by default at `<data dir>/mcc-carpools/store.json`.
//!
//! The whole table set is rewritten after each insert. A missing file is an
//! empty store; an unreadable or corrupt one is an error.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use super::{
    CarpoolStore, DriverRecord, NewDriver, NewRider, RiderRecord, StoreError, Tables,
};

pub struct JsonFileStore {
    path: PathBuf,
    tables: Mutex<Tables>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading existing records.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tables = Self::read_file(&path)?;
        info!(
            path = %path.display(),
            drivers = tables.drivers().len(),
            riders = tables.riders().len(),
            "opened record store"
        );
        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mcc-carpools")
            .join("store.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Result<Tables, StoreError> {
        match fs::read_to_string(path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Tables::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Write the tables to a sibling temp file, then rename over the target.
    fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(tables)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "record store persisted");
        Ok(())
    }
}

impl CarpoolStore for JsonFileStore {
    fn insert_driver(&self, driver: NewDriver) -> Result<DriverRecord, StoreError> {
        let mut tables = self.lock()?;
        // Memory is updated only after the file write succeeds.
        let mut staged = tables.clone();
        let record = staged.insert_driver(driver);
        self.persist(&staged)?;
        *tables = staged;
        Ok(record)
    }

    fn insert_rider(&self, rider: NewRider) -> Result<RiderRecord, StoreError> {
        let mut tables = self.lock()?;
        let mut staged = tables.clone();
        let record = staged.insert_rider(rider)?;
        self.persist(&staged)?;
        *tables = staged;
        Ok(record)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionTag;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_store() -> (JsonFileStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        (JsonFileStore::open(path).unwrap(), dir)
    }

    fn driver(name: &str) -> NewDriver {
        NewDriver {
            name: name.into(),
            email: "d@umich.edu".into(),
            regions: vec![RegionTag::LowerBp],
            address: "900 Packard St".into(),
            drives: json!({ "tuesday": ["7:30"] }),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (store, _dir) = test_store();
        assert!(store.list_drivers().unwrap().is_empty());
        assert!(store.list_riders().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        {
            let store = JsonFileStore::open(path.clone()).unwrap();
            store.insert_driver(driver("Linus")).unwrap();
            store
                .insert_rider(NewRider {
                    name: "Ada".into(),
                    email: "ada@umich.edu".into(),
                    availability: json!({ "monday, 01/05/26": ["9:00"] }),
                    divisions: json!({ "kerrytown": true }),
                })
                .unwrap();
        }

        let reopened = JsonFileStore::open(path).unwrap();
        let drivers = reopened.list_drivers().unwrap();
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].name, "Linus");
        assert_eq!(drivers[0].regions, vec![RegionTag::LowerBp]);
        assert!(reopened.find_rider_by_name("Ada").unwrap().is_some());

        // Ids continue after reload.
        assert_eq!(reopened.insert_driver(driver("Grace")).unwrap().id, 2);
    }

    #[test]
    fn test_duplicate_rider_not_written() {
        let (store, _dir) = test_store();
        let rider = NewRider {
            name: "Ada".into(),
            email: "ada@umich.edu".into(),
            availability: json!({}),
            divisions: json!({}),
        };
        store.insert_rider(rider.clone()).unwrap();
        assert!(matches!(
            store.insert_rider(rider),
            Err(StoreError::DuplicateRider(_))
        ));

        let on_disk = JsonFileStore::open(store.path().to_path_buf()).unwrap();
        assert_eq!(on_disk.list_riders().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_partial_file_defaults_missing_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{ "drivers": [] }"#).unwrap();
        let store = JsonFileStore::open(path).unwrap();
        assert!(store.list_riders().unwrap().is_empty());
    }
}
