//! Catalog persistence on the device. The on-disk representation is a JSON
//! document below `iTunes_Control`; nothing outside this file depends on
//! the format.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

use super::model::Catalog;

const CATALOG_RELATIVE_PATH: &str = "iTunes_Control/iTunes/podsync.json";

/// Location of the catalog document under a given mount root.
pub fn catalog_path(device_root: &Path) -> PathBuf {
    device_root.join(CATALOG_RELATIVE_PATH)
}

impl Catalog {
    /// Load the catalog from the device, or start an empty one (with a
    /// master playlist) when the device has none yet.
    pub fn parse(device_root: &Path) -> Result<Self> {
        let path = catalog_path(device_root);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|e| SyncError::io(&path, e))?;
        serde_json::from_str(&raw).map_err(|source| SyncError::CatalogParse { path, source })
    }

    /// Persist the catalog back to the device.
    pub fn write(&self, device_root: &Path) -> Result<()> {
        let path = catalog_path(device_root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        let raw = serde_json::to_string_pretty(self)
            .map_err(|source| SyncError::CatalogWrite {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, raw).map_err(|e| SyncError::io(&path, e))
    }
}
