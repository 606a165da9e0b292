//! Apply a change set to the catalog: purge stale entries, then index the
//! freshly pushed files from their tags.

use crate::diff::{ChangeSet, Transfer, index_path};
use crate::metadata::{ReadMetadata, TrackMetadata};

use super::model::{Catalog, CatalogEntry};

/// Mirror the file-level changes into the catalog.
///
/// `pushed` is the subset of `change.transfers` whose copy actually
/// succeeded; failed transfers never gain an entry. Files whose tags cannot
/// be read are reported and skipped, leaving a device file without an entry
/// (non-fatal). Committing is the caller's job and keys off the change set,
/// not off what happened here.
pub fn apply(
    change: &ChangeSet,
    pushed: &[Transfer],
    catalog: &mut Catalog,
    reader: &dyn ReadMetadata,
    music_prefix: &str,
) {
    if !change.stale_index_paths.is_empty() {
        // The catalog has no key lookup; one scan over every entry.
        let stale: Vec<String> = catalog
            .tracks
            .iter()
            .map(|t| t.path.clone())
            .filter(|p| change.stale_index_paths.contains(p))
            .collect();

        for path in &stale {
            // Ordinary playlists first, then the master list, then the
            // track itself.
            for playlist in catalog.playlists.iter_mut().filter(|p| !p.master) {
                if playlist.contains(path) {
                    playlist.remove(path);
                }
            }
            catalog.master_playlist_mut().remove(path);
            catalog.remove_track(path);
        }
    }

    for transfer in pushed {
        let meta = match reader.read(&transfer.local) {
            Ok(meta) => meta,
            Err(e) => {
                eprintln!("Error reading '{}': {e}", transfer.local.display());
                continue;
            }
        };
        let entry = entry_from_metadata(&meta, transfer, music_prefix);
        catalog.master_playlist_mut().push(&entry.path);
        catalog.add_track(entry);
    }
}

fn entry_from_metadata(
    meta: &TrackMetadata,
    transfer: &Transfer,
    music_prefix: &str,
) -> CatalogEntry {
    CatalogEntry {
        path: index_path(music_prefix, &transfer.relative),
        title: meta.title.clone(),
        album: meta.album.clone(),
        artist: meta.artist.clone(),
        album_artist: meta.album_artist.clone(),
        genre: meta.genre.clone(),
        file_type: transfer
            .relative
            .extension()
            .map(|s| s.to_string_lossy().into_owned()),
        comment: meta.comment.clone(),
        composer: meta.composer.clone(),
        grouping: meta.grouping.clone(),
        duration_ms: meta.duration_secs * 1000,
        disc: meta.disc,
        disc_total: meta.disc_total,
        track: meta.track,
        track_total: meta.track_total,
        bitrate: meta.bitrate,
        year: meta.year,
        visible: true,
    }
}
