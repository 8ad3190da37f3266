//! Music library browser
//!
//! The library is a directory tree scanned once at startup:
//!
//! ```text
//! <root>/<author>/<album>/<song>.<ext>
//! ```
//!
//! Any directory may carry a `meta.json` (`title`, `format`, `img`).
//! Missing `format` and `img` are inherited from the parent directory.

mod node;

pub use node::{Meta, MetaFile, MetaView, MusicNode, NodeKind};

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

pub const META_FILE: &str = "meta.json";

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "wav", "m4a", "aac"];

#[derive(Debug, Error)]
pub enum MusicError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid meta.json at {path}: {source}")]
    InvalidMeta {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct MusicContext {
    root: MusicNode,
}

impl MusicContext {
    pub fn scan(root_path: &Path) -> Result<Self, MusicError> {
        if !root_path.exists() {
            return Err(MusicError::PathNotFound(root_path.to_path_buf()));
        }
        if !root_path.is_dir() {
            return Err(MusicError::NotADirectory(root_path.to_path_buf()));
        }

        let root_name = root_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut root = MusicNode::new(NodeKind::Context, root_name, read_meta(root_path)?, None);

        let walker = WalkDir::new(root_path)
            .min_depth(1)
            .max_depth(3)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        // Pre-order walk: each album lands under the most recent author,
        // each song under the most recent album.
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error accessing music entry: {}", e);
                    continue;
                }
            };
            let is_dir = entry.file_type().is_dir();
            let name = entry.file_name().to_string_lossy().into_owned();

            match (entry.depth(), is_dir) {
                (1, true) => {
                    let author = MusicNode::new(
                        NodeKind::Author,
                        name,
                        read_meta(entry.path())?,
                        Some(&root.meta),
                    );
                    root.children.push(author);
                }
                (2, true) => {
                    let Some(author) = root.children.last_mut() else {
                        continue;
                    };
                    let album = MusicNode::new(
                        NodeKind::Album,
                        name,
                        read_meta(entry.path())?,
                        Some(&author.meta),
                    );
                    author.children.push(album);
                }
                (3, false) => {
                    let Some(format) = audio_format(entry.path()) else {
                        continue;
                    };
                    let Some(album) = root
                        .children
                        .last_mut()
                        .and_then(|author| author.children.last_mut())
                    else {
                        continue;
                    };
                    let stem = entry
                        .path()
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or(name);
                    let own = MetaFile {
                        title: None,
                        format: Some(format),
                        img: None,
                    };
                    let song = MusicNode::new(NodeKind::Song, stem, own, Some(&album.meta));
                    album.children.push(song);
                }
                _ => debug!("Skipping {}", entry.path().display()),
            }
        }

        let albums: usize = root.children.iter().map(|a| a.children.len()).sum();
        let songs: usize = root
            .children
            .iter()
            .flat_map(|a| &a.children)
            .map(|al| al.children.len())
            .sum();
        info!(
            "Music context loaded from {}: {} authors, {} albums, {} songs",
            root_path.display(),
            root.children.len(),
            albums,
            songs
        );

        Ok(Self { root })
    }

    pub fn root(&self) -> &MusicNode {
        &self.root
    }

    pub fn to_json(&self) -> Value {
        self.root.to_json()
    }

    /// Nodes reached by walking `path` from the root
    ///
    /// Segments are separated by `/`; `*` matches every child. Empty
    /// segments are ignored, so `""` yields the root itself.
    pub fn search(&self, path: &str) -> Vec<&MusicNode> {
        let mut current = vec![&self.root];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|node| node.children.iter())
                .filter(|child| segment == "*" || child.name == segment)
                .collect();
        }
        current
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Lowercase extension if the file is a known audio type
fn audio_format(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    AUDIO_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn read_meta(dir: &Path) -> Result<MetaFile, MusicError> {
    let path = dir.join(META_FILE);
    if !path.is_file() {
        return Ok(MetaFile::default());
    }
    let text = fs::read_to_string(&path)?;
    serde_json::from_str(&text).map_err(|source| MusicError::InvalidMeta { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_audio_format() {
        assert_eq!(audio_format(Path::new("a/b/song.MP3")), Some("mp3".to_string()));
        assert_eq!(audio_format(Path::new("song.flac")), Some("flac".to_string()));
        assert_eq!(audio_format(Path::new("cover.jpg")), None);
        assert_eq!(audio_format(Path::new("README")), None);
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = MusicContext::scan(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, MusicError::PathNotFound(_)));
    }

    #[test]
    fn test_scan_rejects_file_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.mp3");
        fs::write(&file, b"").unwrap();
        assert!(matches!(
            MusicContext::scan(&file).unwrap_err(),
            MusicError::NotADirectory(_)
        ));
    }

    #[test]
    fn test_invalid_meta_fails_scan() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("author")).unwrap();
        fs::write(dir.path().join("author").join(META_FILE), "{not json").unwrap();
        assert!(matches!(
            MusicContext::scan(dir.path()).unwrap_err(),
            MusicError::InvalidMeta { .. }
        ));
    }
}
