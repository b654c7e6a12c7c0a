//! Media library: finding folders of audio files, listing and ordering their
//! tracks, and caching the folder catalog between runs.

mod cache;
mod catalog;
mod model;
mod probe;
mod scan;
mod sort;
mod tracks;

pub use cache::{CATALOG_KEY, FileStore, KeyValueStore, load_catalog, save_catalog};
pub use catalog::{
    CatalogSource, Library, ListingTicket, Selection, load_or_scan, parse_picked_path, rescan,
};
pub use model::{Catalog, Folder, Track};
pub use probe::{EntryInfo, FsProbe, LocalFs};
pub use scan::Scanner;
pub use sort::{SortDirection, sort_tracks};
pub use tracks::list_tracks;
