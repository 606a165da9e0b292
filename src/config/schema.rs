use std::path::PathBuf;

use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/podsync/config.toml` or
/// `~/.config/podsync/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `PODSYNC__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub device: DeviceSettings,
    pub library: LibrarySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device: DeviceSettings::default(),
            library: LibrarySettings::default(),
        }
    }
}

impl Settings {
    /// Absolute path of the music tree on the mounted device.
    pub fn device_music_root(&self) -> PathBuf {
        self.device.mount_root.join(&self.device.music_prefix)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Mount point exposing the device's storage, e.g. `/mnt/ipod` or a
    /// gvfs path under `~/.gvfs`.
    pub mount_root: PathBuf,

    /// Device identifier used in push/mount URIs (`ideviceinfo` UUID).
    pub id: String,

    /// URI scheme the push service copies through.
    pub scheme: String,

    /// Device-internal prefix the music tree lives under.
    pub music_prefix: String,

    /// Program invoked to copy one file onto the device.
    pub copy_command: String,

    /// Program invoked to activate the device mount.
    pub mount_command: String,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            mount_root: PathBuf::new(),
            id: String::new(),
            scheme: "afc".to_string(),
            music_prefix: "iTunes_Control/Music".to_string(),
            copy_command: "gvfs-copy".to_string(),
            mount_command: "gvfs-mount".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Local directory kept in sync with the device.
    pub root: PathBuf,

    /// File name suffixes to treat as audio (case-sensitive, without dot).
    pub extensions: Vec<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            extensions: vec!["mp3".into()],
        }
    }
}
