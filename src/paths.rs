//! Filename normalization: shell-unsafe character cleanup and Unicode
//! (NFC/NFD) equivalence for existence checks.
//!
//! Linux stores filenames as raw bytes, so the same logical name can live
//! on two filesystems in composed (NFC) or decomposed (NFD) form. Existence
//! checks here accept either form; everything assumes UTF-8 names.

use std::fs;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::error::{Result, SyncError};

/// The one character the push URI cannot carry.
const DISALLOWED: char = '#';

/// Pure form of [`sanitize`]: the path with every disallowed character
/// replaced by an underscore. Non-UTF-8 paths are returned untouched.
pub fn sanitized(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if s.contains(DISALLOWED) => PathBuf::from(s.replace(DISALLOWED, "_")),
        _ => path.to_path_buf(),
    }
}

/// Replace disallowed characters, renaming the file on disk when it exists
/// under the original name. A second call on the result is a no-op since
/// the disallowed character is gone.
pub fn sanitize(path: &Path) -> Result<PathBuf> {
    let clean = sanitized(path);
    if clean != path && path.is_file() {
        fs::rename(path, &clean).map_err(|e| SyncError::io(path, e))?;
    }
    Ok(clean)
}

/// The NFC-normalized form of a path, or `None` when it is not valid UTF-8.
pub fn reencode(path: &Path) -> Option<PathBuf> {
    let s = path.to_str()?;
    Some(PathBuf::from(s.nfc().collect::<String>()))
}

/// Whether `path` names a regular file, under either its given byte form or
/// its NFC re-encoding. Non-UTF-8 paths are reported once and treated as
/// absent.
pub fn exists_allowing_reencoding(path: &Path) -> bool {
    if path.is_file() {
        return true;
    }
    match reencode(path) {
        Some(nfc) => nfc.is_file(),
        None => {
            eprintln!(
                "Warning: non-UTF-8 file name, treating as absent: {}",
                path.display()
            );
            false
        }
    }
}
