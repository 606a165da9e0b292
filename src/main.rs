use std::{env, path::PathBuf};

mod catalog;
mod config;
mod device;
mod diff;
mod error;
mod metadata;
mod paths;
mod scan;
mod sync;

use config::Settings;
use device::{CommandMount, CommandPush};
use metadata::LoftyReader;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load()?;

    // An optional argument overrides the configured local music root.
    if let Some(dir) = env::args().nth(1) {
        settings.library.root = PathBuf::from(dir);
    }
    settings.validate()?;

    let mounter = CommandMount {
        program: settings.device.mount_command.clone(),
    };
    let pusher = CommandPush {
        program: settings.device.copy_command.clone(),
    };

    sync::run(&settings, &mounter, &pusher, &LoftyReader)?;
    Ok(())
}
