//! Directory tree scanning for audio files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

fn has_audio_suffix(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };
    // Plain case-sensitive suffix match; a leading dot in the configured
    // entry is tolerated.
    extensions
        .iter()
        .map(|e| e.trim_start_matches('.'))
        .filter(|e| !e.is_empty())
        .any(|e| name.ends_with(e))
}

/// Walk `root` depth-first and yield every regular file whose name carries
/// one of `extensions`. The walk is lazy; re-calling restarts it. Walk
/// errors are passed through for the caller to treat as fatal.
pub fn audio_files<'a>(
    root: &Path,
    extensions: &'a [String],
) -> impl Iterator<Item = walkdir::Result<PathBuf>> + 'a {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(e) if e.file_type().is_file() && has_audio_suffix(e.path(), extensions) => {
                Some(Ok(e.into_path()))
            }
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn has_audio_suffix_is_case_sensitive() {
        let extensions = exts(&["mp3"]);
        assert!(has_audio_suffix(Path::new("/tmp/a.mp3"), &extensions));
        assert!(!has_audio_suffix(Path::new("/tmp/a.MP3"), &extensions));
        assert!(!has_audio_suffix(Path::new("/tmp/a.txt"), &extensions));
    }

    #[test]
    fn has_audio_suffix_matches_any_name_ending_with_the_extension() {
        // Suffix match only; the extension need not follow a dot.
        let extensions = exts(&["mp3"]);
        assert!(has_audio_suffix(Path::new("/tmp/song.smp3"), &extensions));
        assert!(has_audio_suffix(Path::new("/tmp/amp3"), &extensions));
        assert!(has_audio_suffix(Path::new("/tmp/.mp3"), &extensions));
    }

    #[test]
    fn has_audio_suffix_accepts_dotted_config_entries() {
        let extensions = exts(&[".ogg", "mp3"]);
        assert!(has_audio_suffix(Path::new("/tmp/a.ogg"), &extensions));
        assert!(has_audio_suffix(Path::new("/tmp/a.mp3"), &extensions));
    }

    #[test]
    fn audio_files_walks_subdirectories_and_filters() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("Artist").join("Album");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("song.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("top.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

        let extensions = exts(&["mp3"]);
        let found: Vec<PathBuf> = audio_files(dir.path(), &extensions)
            .collect::<walkdir::Result<_>>()
            .unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.contains(&dir.path().join("top.mp3")));
        assert!(found.contains(&sub.join("song.mp3")));
    }

    #[test]
    fn audio_files_is_restartable() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp3"), b"not real").unwrap();

        let extensions = exts(&["mp3"]);
        let first = audio_files(dir.path(), &extensions).count();
        let second = audio_files(dir.path(), &extensions).count();
        assert_eq!(first, 1);
        assert_eq!(second, 1);
    }
}
