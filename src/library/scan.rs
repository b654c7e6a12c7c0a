use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::config::LibrarySettings;

use super::model::{Catalog, Folder};
use super::probe::{EntryInfo, FsProbe};

pub(crate) fn is_audio_file(name: &str, extensions: &[String]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

pub(crate) fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Paths already walked during one scan, shared by every root walk.
///
/// A directory is entered at most once, so it can be added as a folder at
/// most once, no matter how many roots (or symlinks) lead to it.
#[derive(Default)]
struct CatalogBuilder {
    walked: Mutex<HashSet<PathBuf>>,
}

impl CatalogBuilder {
    fn claim(&self, key: PathBuf) -> bool {
        self.walked.lock().insert(key)
    }
}

/// Walks root directories looking for folders that directly hold audio files.
pub struct Scanner<'a, P: FsProbe + ?Sized> {
    probe: &'a P,
    extensions: Vec<String>,
    include_hidden: bool,
    parallel: bool,
}

impl<'a, P: FsProbe + ?Sized> Scanner<'a, P> {
    pub fn new(probe: &'a P, settings: &LibrarySettings) -> Self {
        Self {
            probe,
            extensions: settings.normalized_extensions(),
            include_hidden: settings.include_hidden,
            parallel: settings.parallel_roots,
        }
    }

    /// Walk every root depth-first and collect qualifying folders in
    /// discovery order. Unreadable roots and subdirectories are skipped.
    pub fn scan(&self, roots: &[PathBuf]) -> Catalog {
        let started = Instant::now();
        let builder = CatalogBuilder::default();

        let folders: Vec<Folder> = if self.parallel {
            roots
                .par_iter()
                .map(|root| self.walk_root(root, &builder))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        } else {
            roots
                .iter()
                .flat_map(|root| self.walk_root(root, &builder))
                .collect()
        };

        tracing::info!(
            roots = roots.len(),
            folders = folders.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "library scan finished"
        );
        Catalog { folders }
    }

    fn walk_root(&self, root: &Path, builder: &CatalogBuilder) -> Vec<Folder> {
        let mut found = Vec::new();
        if !self.probe.exists(root) {
            tracing::debug!(root = %root.display(), "scan root does not exist");
            return found;
        }
        self.walk(root, builder, &mut found);
        found
    }

    fn walk(&self, dir: &Path, builder: &CatalogBuilder, found: &mut Vec<Folder>) {
        let key = self.probe.normalize(dir);
        if !builder.claim(key.clone()) {
            return;
        }

        let entries = match self.probe.list_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                return;
            }
        };

        if entries.iter().any(|e| self.is_playable(e)) {
            found.push(Folder::from_path(key));
        }

        for sub in entries
            .iter()
            .filter(|e| e.is_dir && (self.include_hidden || !is_hidden(&e.name)))
        {
            self.walk(&sub.path, builder, found);
        }
    }

    fn is_playable(&self, entry: &EntryInfo) -> bool {
        entry.is_file
            && (self.include_hidden || !is_hidden(&entry.name))
            && is_audio_file(&entry.name, &self.extensions)
    }
}
