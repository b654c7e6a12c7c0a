use std::path::Path;

use lofty::prelude::*;

use crate::config::LibrarySettings;
use crate::error::ScanError;

use super::model::{Folder, Track};
use super::probe::FsProbe;
use super::scan::{is_audio_file, is_hidden};

/// List the playable files directly inside `folder`, in filesystem order.
///
/// Subdirectories are ignored; they are folders of their own.
pub fn list_tracks<P: FsProbe + ?Sized>(
    probe: &P,
    folder: &Folder,
    settings: &LibrarySettings,
) -> Result<Vec<Track>, ScanError> {
    let extensions = settings.normalized_extensions();
    let entries = probe
        .list_dir(&folder.path)
        .map_err(|source| ScanError::Unreadable {
            path: folder.path.clone(),
            source,
        })?;

    let tracks: Vec<Track> = entries
        .iter()
        .filter(|e| e.is_file)
        .filter(|e| settings.include_hidden || !is_hidden(&e.name))
        .filter(|e| is_audio_file(&e.name, &extensions))
        .map(|e| {
            let mut track = Track::from_path(&e.path);
            track.name = e.name.clone();
            if settings.read_tags {
                apply_tags(&mut track, &e.path);
            }
            track
        })
        .collect();

    tracing::debug!(folder = %folder.path.display(), tracks = tracks.len(), "listed folder");
    Ok(tracks)
}

fn apply_tags(track: &mut Track, path: &Path) {
    let Ok(tagged) = lofty::read_from_path(path) else {
        return;
    };
    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return;
    };

    track.artist = tag
        .artist()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    track.album = tag
        .album()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
}
