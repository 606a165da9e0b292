//! The reconciliation core: compare the device music tree against the local
//! tree and produce the change set the file sync and the catalog rebuild
//! both consume.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{Result, SyncError};
use crate::paths;
use crate::scan;

/// One local file queued for copying to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Absolute local path (post-sanitization).
    pub local: PathBuf,
    /// Path relative to both music roots (post-sanitization).
    pub relative: PathBuf,
    /// Whether a device copy already existed with a differing size.
    pub update: bool,
}

/// Result of one diff run.
#[derive(Debug, Default)]
pub struct ChangeSet {
    /// Canonical catalog keys whose entries must be purged: device files
    /// with no local counterpart, plus the old entry of every update.
    pub stale_index_paths: BTreeSet<String>,

    /// Absolute device paths to physically delete. Update victims are not
    /// listed here; the copy overwrites them in place.
    pub stale_device_files: Vec<PathBuf>,

    /// Files to copy, in local-tree traversal order.
    pub transfers: Vec<Transfer>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.stale_index_paths.is_empty()
            && self.stale_device_files.is_empty()
            && self.transfers.is_empty()
    }
}

/// Canonical catalog key for a file below the device mount point: the
/// mount-relative path with separators replaced by colons, keeping the
/// leading colon (`:iTunes_Control:Music:Artist:Song.mp3`).
pub fn index_path(music_prefix: &str, relative: &Path) -> String {
    let mut key = String::from(":");
    key.push_str(&music_prefix.replace('/', ":"));
    for comp in relative.components() {
        key.push(':');
        key.push_str(&comp.as_os_str().to_string_lossy());
    }
    key
}

/// Compare both trees and emit the change set.
///
/// Pass 1 walks the device tree: files with no local counterpart (allowing
/// NFC re-encoding) become deletions. Pass 2 walks the local tree: files
/// absent on the device, or present with a differing byte size, become
/// transfers; the latter also queue their old catalog entry for purging.
/// Size is the only change signal; equal-size edits go undetected.
pub fn diff(settings: &Settings) -> Result<ChangeSet> {
    let device_music_root = settings.device_music_root();
    let local_root = &settings.library.root;
    let extensions = &settings.library.extensions;
    let prefix = &settings.device.music_prefix;

    if !local_root.is_dir() {
        return Err(SyncError::NotADirectory {
            path: local_root.clone(),
        });
    }

    let mut change = ChangeSet::default();

    // Deletion pass over the device tree.
    for entry in scan::audio_files(&device_music_root, extensions) {
        let device_file = entry.map_err(|e| SyncError::walk(&device_music_root, e))?;
        let Ok(relative) = device_file.strip_prefix(&device_music_root) else {
            continue;
        };
        if !paths::exists_allowing_reencoding(&local_root.join(relative)) {
            let canonical = paths::reencode(relative).unwrap_or_else(|| relative.to_path_buf());
            change.stale_index_paths.insert(index_path(prefix, &canonical));
            change.stale_device_files.push(device_file);
        }
    }

    // Addition/update pass over the local tree.
    for entry in scan::audio_files(local_root, extensions) {
        let local_file = entry.map_err(|e| SyncError::walk(local_root, e))?;
        let Ok(relative) = local_file.strip_prefix(local_root) else {
            continue;
        };
        let relative = relative.to_path_buf();

        // `#` cannot travel through the push URI; rename before comparing
        // so every later step sees the clean name.
        let local_file = paths::sanitize(&local_file)?;
        let relative = paths::sanitized(&relative);

        let device_file = device_music_root.join(&relative);
        match fs::metadata(&device_file) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                change.transfers.push(Transfer {
                    local: local_file,
                    relative,
                    update: false,
                });
            }
            Err(e) => return Err(SyncError::io(&device_file, e)),
            Ok(device_meta) => {
                let local_meta =
                    fs::metadata(&local_file).map_err(|e| SyncError::io(&local_file, e))?;
                if device_meta.len() != local_meta.len() {
                    // Update: the old catalog entry must go before the new
                    // one is added.
                    change
                        .stale_index_paths
                        .insert(index_path(prefix, &relative));
                    change.transfers.push(Transfer {
                        local: local_file,
                        relative,
                        update: true,
                    });
                }
            }
        }
    }

    Ok(change)
}
