//! Background threads for library work, so the TUI never blocks on disk.

use std::sync::mpsc::Sender;
use std::thread;

use crate::config::{CacheSettings, LibrarySettings};
use crate::error::ScanError;
use crate::library::{
    Catalog, CatalogSource, FileStore, ListingTicket, LocalFs, Scanner, Track, list_tracks,
    load_or_scan, rescan,
};

/// Results posted back to the event loop.
pub enum LibraryMsg {
    Catalog {
        catalog: Catalog,
        source: CatalogSource,
    },
    Listing {
        ticket: ListingTicket,
        result: Result<Vec<Track>, ScanError>,
    },
}

/// Load the folder catalog. With `force`, the cache is ignored and
/// overwritten by a fresh scan.
pub fn spawn_catalog_load(
    library: LibrarySettings,
    cache: CacheSettings,
    force: bool,
    tx: Sender<LibraryMsg>,
) {
    thread::spawn(move || {
        let probe = LocalFs::new(library.follow_links);
        let scanner = Scanner::new(&probe, &library);
        let roots = library.resolved_roots();
        let mut store = if cache.enabled {
            cache.resolved_path().map(FileStore::new)
        } else {
            None
        };

        let (catalog, source) = if force {
            (rescan(store.as_mut(), &scanner, &roots), CatalogSource::Scan)
        } else {
            load_or_scan(store.as_mut(), &scanner, &roots)
        };
        let _ = tx.send(LibraryMsg::Catalog { catalog, source });
    });
}

/// List the tracks of the folder named by `ticket`.
pub fn spawn_listing(ticket: ListingTicket, library: LibrarySettings, tx: Sender<LibraryMsg>) {
    thread::spawn(move || {
        let probe = LocalFs::new(library.follow_links);
        let result = list_tracks(&probe, &ticket.folder, &library);
        let _ = tx.send(LibraryMsg::Listing { ticket, result });
    });
}
