use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A directory that directly holds at least one playable file.
///
/// `path` is the identity; two folders with the same path are the same folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub path: PathBuf,
}

impl Folder {
    /// Build a folder whose name is the basename of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

/// One playable audio file. Its identity is `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_art_url: Option<String>,
}

impl Track {
    /// A track with no tag metadata, named after its file name.
    pub fn from_path(path: &Path) -> Self {
        Self {
            name: path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("UNKNOWN")
                .to_string(),
            path: path.to_path_buf(),
            artist: None,
            album: None,
            cover_art_url: None,
        }
    }
}

/// The discovered folders, in discovery order, deduplicated by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub folders: Vec<Folder>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}
