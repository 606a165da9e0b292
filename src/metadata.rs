//! Fixed-field audio metadata, read through the [`ReadMetadata`] seam so
//! the catalog rebuild can be tested without real audio files.

use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::ItemKey;
use thiserror::Error;

/// Tag data for one audio file. Disc/track numbers are `None` when the tag
/// is missing or zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub comment: Option<String>,
    pub composer: Option<String>,
    pub grouping: Option<String>,
    pub duration_secs: u64,
    pub disc: Option<u32>,
    pub disc_total: Option<u32>,
    pub track: Option<u32>,
    pub track_total: Option<u32>,
    /// Audio bitrate in kbps.
    pub bitrate: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("unreadable tags: {0}")]
    Unreadable(#[from] lofty::error::LoftyError),
}

pub trait ReadMetadata {
    fn read(&self, path: &Path) -> Result<TrackMetadata, MetadataError>;
}

/// Production reader backed by lofty.
pub struct LoftyReader;

impl ReadMetadata for LoftyReader {
    fn read(&self, path: &Path) -> Result<TrackMetadata, MetadataError> {
        let tagged = lofty::read_from_path(path)?;
        let props = tagged.properties();

        let mut meta = TrackMetadata {
            duration_secs: props.duration().as_secs(),
            bitrate: props.audio_bitrate(),
            ..TrackMetadata::default()
        };

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            meta.title = non_empty(tag.get_string(ItemKey::TrackTitle));
            meta.album = non_empty(tag.get_string(ItemKey::AlbumTitle));
            meta.artist = non_empty(tag.get_string(ItemKey::TrackArtist));
            meta.album_artist = non_empty(tag.get_string(ItemKey::AlbumArtist));
            meta.genre = non_empty(tag.get_string(ItemKey::Genre));
            meta.comment = non_empty(tag.get_string(ItemKey::Comment));
            meta.composer = non_empty(tag.get_string(ItemKey::Composer));
            meta.grouping = non_empty(tag.get_string(ItemKey::ContentGroup));
            meta.disc = nonzero(tag.get_string(ItemKey::DiscNumber));
            meta.disc_total = nonzero(tag.get_string(ItemKey::DiscTotal));
            meta.track = nonzero(tag.get_string(ItemKey::TrackNumber));
            meta.track_total = nonzero(tag.get_string(ItemKey::TrackTotal));
            meta.year = tag
                .get_string(ItemKey::Year)
                .and_then(|v| v.trim().parse().ok());
        }

        Ok(meta)
    }
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn nonzero(v: Option<&str>) -> Option<u32> {
    v.and_then(|s| s.trim().parse::<u32>().ok()).filter(|&n| n != 0)
}
