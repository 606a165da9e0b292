use serde::{Deserialize, Serialize};

/// One indexed track, keyed by its canonical device path
/// (`:iTunes_Control:Music:Artist:Song.mp3`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub path: String,
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    /// Derived from the file extension.
    pub file_type: Option<String>,
    pub comment: Option<String>,
    pub composer: Option<String>,
    pub grouping: Option<String>,
    pub duration_ms: u64,
    pub disc: Option<u32>,
    pub disc_total: Option<u32>,
    pub track: Option<u32>,
    pub track_total: Option<u32>,
    pub bitrate: Option<u32>,
    pub year: Option<i32>,
    pub visible: bool,
}

/// A named list of track keys. Exactly one playlist is the master list
/// every valid track belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    pub master: bool,
    pub items: Vec<String>,
}

impl Playlist {
    pub fn contains(&self, entry_path: &str) -> bool {
        self.items.iter().any(|p| p == entry_path)
    }

    pub fn remove(&mut self, entry_path: &str) {
        self.items.retain(|p| p != entry_path);
    }

    pub fn push(&mut self, entry_path: &str) {
        self.items.push(entry_path.to_string());
    }
}

/// In-memory handle on the device catalog. The tracks list offers no key
/// lookup; callers scan it, which is fine at catalog sizes of tens of
/// thousands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub tracks: Vec<CatalogEntry>,
    pub playlists: Vec<Playlist>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            playlists: vec![Playlist {
                name: "Music".to_string(),
                master: true,
                items: Vec::new(),
            }],
        }
    }
}

impl Catalog {
    pub fn add_track(&mut self, entry: CatalogEntry) {
        self.tracks.push(entry);
    }

    pub fn remove_track(&mut self, entry_path: &str) {
        self.tracks.retain(|t| t.path != entry_path);
    }

    /// The master playlist, created on demand if the parsed catalog lacks
    /// one.
    pub fn master_playlist_mut(&mut self) -> &mut Playlist {
        if !self.playlists.iter().any(|p| p.master) {
            self.playlists.push(Playlist {
                name: "Music".to_string(),
                master: true,
                items: Vec::new(),
            });
        }
        let idx = self.playlists.iter().position(|p| p.master).unwrap_or(0);
        &mut self.playlists[idx]
    }
}
