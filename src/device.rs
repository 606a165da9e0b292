//! External device services: the push transport and mount activation.
//!
//! Both are command-line programs in production (gvfs tooling); the traits
//! keep the orchestrator testable without a device.

use std::path::Path;
use std::process::Command;

use crate::config::DeviceSettings;
use crate::error::{Result, SyncError};

/// Copies one local file onto the device.
pub trait PushFiles {
    fn push(&self, local: &Path, remote_uri: &str) -> Result<()>;
}

/// Asks the system to mount the device. Fire-and-forget; the orchestrator
/// verifies readiness separately.
pub trait ActivateMount {
    fn activate(&self, device_uri: &str);
}

/// Destination URI for one transfer:
/// `<scheme>://<device_id>/<music_prefix>/<relative>`.
pub fn remote_uri(device: &DeviceSettings, relative: &Path) -> String {
    format!(
        "{}://{}/{}/{}",
        device.scheme,
        device.id,
        device.music_prefix,
        slash_path(relative)
    )
}

/// URI handed to the mount service: `<scheme>://<device_id>/`.
pub fn mount_uri(device: &DeviceSettings) -> String {
    format!("{}://{}/", device.scheme, device.id)
}

fn slash_path(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

/// Production push: spawn the configured copy program (`gvfs-copy` by
/// default) and surface a non-zero exit status as a push failure.
pub struct CommandPush {
    pub program: String,
}

impl PushFiles for CommandPush {
    fn push(&self, local: &Path, remote_uri: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .arg(local)
            .arg(remote_uri)
            .status()
            .map_err(|e| SyncError::Push {
                uri: remote_uri.to_string(),
                reason: format!("could not run {}: {e}", self.program),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(SyncError::Push {
                uri: remote_uri.to_string(),
                reason: format!("{} exited with {status}", self.program),
            })
        }
    }
}

/// Production mount activation: spawn the configured mount program once and
/// ignore its outcome.
pub struct CommandMount {
    pub program: String,
}

impl ActivateMount for CommandMount {
    fn activate(&self, device_uri: &str) {
        let _ = Command::new(&self.program).arg(device_uri).status();
    }
}
