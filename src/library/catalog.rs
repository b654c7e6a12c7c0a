//! The folder catalog: cache-or-scan at startup, the selected folder's track
//! list, and guarding against listings that arrive after the selection moved on.

use std::path::{Path, PathBuf};

use crate::error::{PickError, ScanError};

use super::cache::{KeyValueStore, load_catalog, save_catalog};
use super::model::{Catalog, Folder, Track};
use super::probe::FsProbe;
use super::scan::Scanner;
use super::sort::{SortDirection, sort_tracks};

/// Where the startup catalog came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Cache,
    Scan,
}

/// Load the cached catalog, or scan `roots` and persist the result when no
/// cache exists. A cache hit performs no filesystem access at all.
pub fn load_or_scan<S: KeyValueStore + ?Sized, P: FsProbe + ?Sized>(
    mut store: Option<&mut S>,
    scanner: &Scanner<'_, P>,
    roots: &[PathBuf],
) -> (Catalog, CatalogSource) {
    if let Some(store) = store.as_deref() {
        match load_catalog(store) {
            Ok(Some(catalog)) => {
                tracing::info!(folders = catalog.len(), "loaded folder catalog from cache");
                return (catalog, CatalogSource::Cache);
            }
            Ok(None) => tracing::info!("no cached folder catalog, scanning"),
            Err(e) => tracing::warn!(error = %e, "unreadable folder cache, scanning"),
        }
    }

    (rescan(store.as_deref_mut(), scanner, roots), CatalogSource::Scan)
}

/// Scan `roots` unconditionally and overwrite the cached catalog.
pub fn rescan<S: KeyValueStore + ?Sized, P: FsProbe + ?Sized>(
    store: Option<&mut S>,
    scanner: &Scanner<'_, P>,
    roots: &[PathBuf],
) -> Catalog {
    let catalog = scanner.scan(roots);
    if let Some(store) = store {
        if let Err(e) = save_catalog(store, &catalog) {
            tracing::warn!(error = %e, "failed to persist folder catalog");
        }
    }
    catalog
}

/// Accept a `file://` URI or a plain path from the directory prompt.
pub fn parse_picked_path(input: &str) -> PathBuf {
    let input = input.trim();
    PathBuf::from(input.strip_prefix("file://").unwrap_or(input))
}

/// Identifies one folder listing request. Results carrying an outdated
/// ticket are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTicket {
    generation: u64,
    pub folder: Folder,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub folder: Folder,
    /// Chosen through the directory prompt rather than the catalog.
    pub picked: bool,
    pub loading: bool,
    pub sort: Option<SortDirection>,
    listed: Vec<Track>,
    shown: Vec<Track>,
}

impl Selection {
    /// The track list as currently displayed (sorted or listing order).
    pub fn tracks(&self) -> &[Track] {
        &self.shown
    }
}

#[derive(Debug, Default)]
pub struct Library {
    catalog: Catalog,
    selection: Option<Selection>,
    generation: u64,
}

impl Library {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn folders(&self) -> &[Folder] {
        &self.catalog.folders
    }

    /// Replace the folder list after a scan. The current selection stays.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn tracks(&self) -> &[Track] {
        self.selection.as_ref().map(Selection::tracks).unwrap_or(&[])
    }

    /// Select `folder` and hand out the ticket its listing must come back with.
    /// Any listing still in flight for an earlier selection becomes stale.
    pub fn select(&mut self, folder: Folder) -> ListingTicket {
        self.select_inner(folder, false)
    }

    /// Turn a directory-prompt outcome into a selection. The picked folder is
    /// shown immediately but never added to the catalog or its cache.
    /// Cancellation is absorbed and yields `Ok(None)`.
    pub fn select_picked<P: FsProbe + ?Sized>(
        &mut self,
        probe: &P,
        outcome: Result<PathBuf, PickError>,
    ) -> Result<Option<ListingTicket>, PickError> {
        let path = match outcome {
            Ok(path) => path,
            Err(PickError::Cancelled) => {
                tracing::debug!("directory pick cancelled");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if !probe.is_dir(&path) {
            return Err(PickError::NotADirectory(path));
        }
        Ok(Some(self.select_inner(Folder::from_path(path), true)))
    }

    fn select_inner(&mut self, folder: Folder, picked: bool) -> ListingTicket {
        self.generation += 1;
        self.selection = Some(Selection {
            folder: folder.clone(),
            picked,
            loading: true,
            sort: None,
            listed: Vec::new(),
            shown: Vec::new(),
        });
        ListingTicket {
            generation: self.generation,
            folder,
        }
    }

    /// Apply a finished listing. Returns `Ok(false)` when the ticket is stale
    /// and the result was discarded. A failed listing leaves the selection
    /// with an empty track list and hands the error back.
    pub fn finish_listing(
        &mut self,
        ticket: &ListingTicket,
        result: Result<Vec<Track>, ScanError>,
    ) -> Result<bool, ScanError> {
        let current = self.generation;
        let Some(selection) = self
            .selection
            .as_mut()
            .filter(|s| ticket.generation == current && s.folder == ticket.folder)
        else {
            tracing::debug!(folder = %ticket.folder.path.display(), "discarding stale folder listing");
            return Ok(false);
        };

        selection.loading = false;
        selection.sort = None;
        match result {
            Ok(tracks) => {
                selection.shown = tracks.clone();
                selection.listed = tracks;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "folder listing failed");
                selection.listed.clear();
                selection.shown.clear();
                Err(e)
            }
        }
    }

    /// Reorder the displayed tracks. `None` restores listing order.
    pub fn set_sort(&mut self, sort: Option<SortDirection>) {
        if let Some(selection) = self.selection.as_mut() {
            selection.sort = sort;
            selection.shown = match sort {
                Some(direction) => sort_tracks(&selection.listed, direction),
                None => selection.listed.clone(),
            };
        }
    }

    /// Cycle unsorted -> ascending -> descending -> unsorted.
    pub fn cycle_sort(&mut self) -> Option<SortDirection> {
        let next = match self.selection.as_ref().and_then(|s| s.sort) {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        };
        self.set_sort(next);
        next
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.selection
            .as_ref()
            .map(|s| s.folder.path == path)
            .unwrap_or(false)
    }
}
