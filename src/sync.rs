//! The sync run: mount check, diff, file-level changes, catalog rebuild.

use std::fs;
use std::path::Path;

use crate::catalog::{self, Catalog};
use crate::config::Settings;
use crate::device::{self, ActivateMount, PushFiles};
use crate::diff::{self, Transfer};
use crate::error::{Result, SyncError};
use crate::metadata::ReadMetadata;

/// Run one full sync.
///
/// Never diffs against an unavailable device: if the music root is missing,
/// mount activation is fired once and the root re-checked; a still-missing
/// root fails the run before any deletion happens. Individual copy failures
/// are reported and skipped; the rest of the run continues, and only
/// successfully copied files reach the catalog.
pub fn run(
    settings: &Settings,
    mounter: &dyn ActivateMount,
    pusher: &dyn PushFiles,
    reader: &dyn ReadMetadata,
) -> Result<()> {
    let music_root = settings.device_music_root();
    if !music_root.is_dir() {
        mounter.activate(&device::mount_uri(&settings.device));
        if !music_root.is_dir() {
            return Err(SyncError::DeviceNotReady { root: music_root });
        }
    }

    let change = diff::diff(settings)?;
    if change.is_empty() {
        println!("Nothing to sync.");
        return Ok(());
    }

    for device_file in &change.stale_device_files {
        let shown = device_file.strip_prefix(&music_root).unwrap_or(device_file);
        println!("Deleting from device: {}", shown.display());
        fs::remove_file(device_file).map_err(|e| SyncError::io(device_file, e))?;
    }

    let mut pushed: Vec<Transfer> = Vec::new();
    for transfer in &change.transfers {
        if let Err(e) = push_one(settings, pusher, transfer, &music_root) {
            eprintln!("Error copying '{}': {e}", transfer.local.display());
            continue;
        }
        pushed.push(transfer.clone());
    }

    let mut catalog = Catalog::parse(&settings.device.mount_root)?;
    catalog::apply(
        &change,
        &pushed,
        &mut catalog,
        reader,
        &settings.device.music_prefix,
    );
    catalog.write(&settings.device.mount_root)?;

    Ok(())
}

fn push_one(
    settings: &Settings,
    pusher: &dyn PushFiles,
    transfer: &Transfer,
    music_root: &Path,
) -> Result<()> {
    let device_file = music_root.join(&transfer.relative);
    if let Some(parent) = device_file.parent() {
        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }

    let verb = if transfer.update { "Updating" } else { "Copying" };
    println!("{verb}: {}", transfer.relative.display());

    let uri = device::remote_uri(&settings.device, &transfer.relative);
    pusher.push(&transfer.local, &uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, Playlist};
    use crate::metadata::{MetadataError, TrackMetadata};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    /// Test double that performs the copy locally, mimicking what gvfs-copy
    /// does against the mounted tree.
    struct LocalCopyPush {
        music_root: PathBuf,
        prefix: String,
        pushed: RefCell<Vec<String>>,
        fail_for: Vec<String>,
    }

    impl PushFiles for LocalCopyPush {
        fn push(&self, local: &Path, remote_uri: &str) -> crate::error::Result<()> {
            let marker = format!("/{}/", self.prefix);
            let relative = remote_uri
                .split_once(&marker)
                .map(|(_, rel)| rel.to_string())
                .unwrap_or_default();
            if self.fail_for.contains(&relative) {
                return Err(SyncError::Push {
                    uri: remote_uri.to_string(),
                    reason: "copy command exited with 1".to_string(),
                });
            }
            fs::copy(local, self.music_root.join(&relative))
                .map_err(|e| SyncError::io(local, e))?;
            self.pushed.borrow_mut().push(relative);
            Ok(())
        }
    }

    struct RecordingMount {
        calls: RefCell<u32>,
    }

    impl ActivateMount for RecordingMount {
        fn activate(&self, _device_uri: &str) {
            *self.calls.borrow_mut() += 1;
        }
    }

    struct FakeReader {
        duration_secs: u64,
        title: String,
    }

    impl ReadMetadata for FakeReader {
        fn read(&self, _path: &Path) -> std::result::Result<TrackMetadata, MetadataError> {
            Ok(TrackMetadata {
                title: Some(self.title.clone()),
                duration_secs: self.duration_secs,
                ..TrackMetadata::default()
            })
        }
    }

    struct Fixture {
        _dir: TempDir,
        settings: Settings,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.device.mount_root = dir.path().join("device");
        settings.device.id = "test-device".to_string();
        settings.library.root = dir.path().join("local");
        fs::create_dir_all(settings.device_music_root()).unwrap();
        fs::create_dir_all(&settings.library.root).unwrap();
        Fixture {
            _dir: dir,
            settings,
        }
    }

    fn local_push(settings: &Settings) -> LocalCopyPush {
        LocalCopyPush {
            music_root: settings.device_music_root(),
            prefix: settings.device.music_prefix.clone(),
            pushed: RefCell::new(Vec::new()),
            fail_for: Vec::new(),
        }
    }

    fn write(root: &Path, relative: &str, len: usize) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![1u8; len]).unwrap();
    }

    fn reader() -> FakeReader {
        FakeReader {
            duration_secs: 123,
            title: "Title".to_string(),
        }
    }

    fn mount() -> RecordingMount {
        RecordingMount {
            calls: RefCell::new(0),
        }
    }

    #[test]
    fn missing_device_root_activates_mount_then_fails() {
        let f = fixture();
        let mut settings = f.settings.clone();
        settings.device.mount_root = settings.device.mount_root.join("gone");

        let mounter = mount();
        let pusher = local_push(&settings);
        let result = run(&settings, &mounter, &pusher, &reader());

        assert!(matches!(result, Err(SyncError::DeviceNotReady { .. })));
        assert_eq!(*mounter.calls.borrow(), 1);
        assert!(pusher.pushed.borrow().is_empty());
    }

    #[test]
    fn empty_change_set_skips_the_catalog_commit() {
        let f = fixture();
        write(&f.settings.library.root, "Artist/Same.mp3", 2000);
        write(&f.settings.device_music_root(), "Artist/Same.mp3", 2000);

        let pusher = local_push(&f.settings);
        run(&f.settings, &mount(), &pusher, &reader()).unwrap();

        assert!(pusher.pushed.borrow().is_empty());
        // No catalog document was created on a no-op run.
        assert!(
            !f.settings
                .device
                .mount_root
                .join("iTunes_Control/iTunes/podsync.json")
                .exists()
        );
    }

    #[test]
    fn stale_device_file_is_deleted_and_uncatalogued() {
        let f = fixture();
        write(&f.settings.device_music_root(), "Artist/Song.mp3", 500);

        // Seed a catalog knowing the track, on the master list and one more.
        let key = ":iTunes_Control:Music:Artist:Song.mp3";
        let mut catalog = Catalog::default();
        catalog.master_playlist_mut().push(key);
        catalog.playlists.push(Playlist {
            name: "Road Trip".to_string(),
            master: false,
            items: vec![key.to_string()],
        });
        catalog.add_track(CatalogEntry {
            path: key.to_string(),
            title: Some("Song".to_string()),
            album: None,
            artist: None,
            album_artist: None,
            genre: None,
            file_type: Some("mp3".to_string()),
            comment: None,
            composer: None,
            grouping: None,
            duration_ms: 1000,
            disc: None,
            disc_total: None,
            track: None,
            track_total: None,
            bitrate: None,
            year: None,
            visible: true,
        });
        catalog.write(&f.settings.device.mount_root).unwrap();

        run(&f.settings, &mount(), &local_push(&f.settings), &reader()).unwrap();

        assert!(
            !f.settings
                .device_music_root()
                .join("Artist/Song.mp3")
                .exists()
        );
        let reloaded = Catalog::parse(&f.settings.device.mount_root).unwrap();
        assert!(reloaded.tracks.is_empty());
        assert!(reloaded.playlists.iter().all(|p| !p.contains(key)));
    }

    #[test]
    fn new_local_file_is_copied_and_catalogued() {
        let f = fixture();
        write(&f.settings.library.root, "Artist/New.mp3", 1000);

        let pusher = local_push(&f.settings);
        run(&f.settings, &mount(), &pusher, &reader()).unwrap();

        let device_copy = f.settings.device_music_root().join("Artist/New.mp3");
        assert!(device_copy.is_file());
        assert_eq!(fs::metadata(&device_copy).unwrap().len(), 1000);
        assert_eq!(pusher.pushed.borrow().as_slice(), ["Artist/New.mp3"]);

        let catalog = Catalog::parse(&f.settings.device.mount_root).unwrap();
        assert_eq!(catalog.tracks.len(), 1);
        assert_eq!(catalog.tracks[0].path, ":iTunes_Control:Music:Artist:New.mp3");
        assert_eq!(catalog.tracks[0].duration_ms, 123_000);
        assert!(
            catalog
                .playlists
                .iter()
                .any(|p| p.master && p.contains(&catalog.tracks[0].path))
        );
    }

    #[test]
    fn changed_file_is_recopied_and_reindexed() {
        let f = fixture();
        let key = ":iTunes_Control:Music:Artist:Changed.mp3";
        write(&f.settings.library.root, "Artist/Changed.mp3", 3000);
        write(&f.settings.device_music_root(), "Artist/Changed.mp3", 2500);

        let mut catalog = Catalog::default();
        catalog.master_playlist_mut().push(key);
        catalog.add_track(CatalogEntry {
            path: key.to_string(),
            title: Some("Old Title".to_string()),
            album: None,
            artist: None,
            album_artist: None,
            genre: None,
            file_type: Some("mp3".to_string()),
            comment: None,
            composer: None,
            grouping: None,
            duration_ms: 999,
            disc: None,
            disc_total: None,
            track: None,
            track_total: None,
            bitrate: None,
            year: None,
            visible: true,
        });
        catalog.write(&f.settings.device.mount_root).unwrap();

        let fresh = FakeReader {
            duration_secs: 200,
            title: "New Title".to_string(),
        };
        run(&f.settings, &mount(), &local_push(&f.settings), &fresh).unwrap();

        let device_copy = f.settings.device_music_root().join("Artist/Changed.mp3");
        assert_eq!(fs::metadata(&device_copy).unwrap().len(), 3000);

        let reloaded = Catalog::parse(&f.settings.device.mount_root).unwrap();
        assert_eq!(reloaded.tracks.len(), 1);
        assert_eq!(reloaded.tracks[0].path, key);
        assert_eq!(reloaded.tracks[0].title.as_deref(), Some("New Title"));
        assert_eq!(reloaded.tracks[0].duration_ms, 200_000);
        // Exactly one master entry survives the delete-then-add.
        let master = reloaded.playlists.iter().find(|p| p.master).unwrap();
        assert_eq!(master.items.iter().filter(|p| *p == key).count(), 1);
    }

    #[test]
    fn failed_push_skips_cataloguing_but_not_the_rest() {
        let f = fixture();
        write(&f.settings.library.root, "Artist/Bad.mp3", 100);
        write(&f.settings.library.root, "Artist/Good.mp3", 100);

        let mut pusher = local_push(&f.settings);
        pusher.fail_for = vec!["Artist/Bad.mp3".to_string()];
        run(&f.settings, &mount(), &pusher, &reader()).unwrap();

        assert_eq!(pusher.pushed.borrow().as_slice(), ["Artist/Good.mp3"]);
        let catalog = Catalog::parse(&f.settings.device.mount_root).unwrap();
        assert_eq!(catalog.tracks.len(), 1);
        assert_eq!(catalog.tracks[0].path, ":iTunes_Control:Music:Artist:Good.mp3");
    }

    #[test]
    fn destination_directories_are_created_for_new_albums() {
        let f = fixture();
        write(&f.settings.library.root, "New Artist/New Album/Track.mp3", 64);

        run(&f.settings, &mount(), &local_push(&f.settings), &reader()).unwrap();
        assert!(
            f.settings
                .device_music_root()
                .join("New Artist/New Album/Track.mp3")
                .is_file()
        );
    }
}
