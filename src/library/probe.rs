//! Filesystem access used by the scanner and the track lister.
//!
//! The probe is a seam: the real implementation reads the local disk through
//! `walkdir`, tests substitute an in-memory tree or a call counter.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One directory entry as seen by the probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_file: bool,
    pub is_dir: bool,
}

pub trait FsProbe: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory that can be listed.
    fn is_dir(&self, path: &Path) -> bool {
        self.exists(path) && self.list_dir(path).is_ok()
    }

    /// Direct children of `path`, in the order the filesystem yields them.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<EntryInfo>>;

    /// Key used to recognise the same directory reached by different paths.
    fn normalize(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// Reads the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFs {
    follow_links: bool,
}

impl LocalFs {
    pub fn new(follow_links: bool) -> Self {
        Self { follow_links }
    }
}

impl FsProbe for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<EntryInfo>> {
        // Opening the directory up front surfaces permission and
        // non-existence errors, which walkdir would otherwise report per entry.
        std::fs::read_dir(path)?;

        let mut out = Vec::new();
        for entry in WalkDir::new(path)
            .follow_links(self.follow_links)
            .min_depth(1)
            .max_depth(1)
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    // Broken symlinks and entries that vanished mid-listing.
                    tracing::debug!(dir = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let file_type = entry.file_type();
            out.push(EntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                is_file: file_type.is_file(),
                is_dir: file_type.is_dir(),
            });
        }
        Ok(out)
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}
