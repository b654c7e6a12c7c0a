//! Ordering of a folder's track list.
//!
//! Names are compared case-folded, with the path as a tie-breaker so the
//! comparator is a total order and `Descending` is the exact reverse of
//! `Ascending`.

use std::cmp::Ordering;

use super::model::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Case-folded comparison by Unicode code point. This is not locale
/// collation: accented initials such as `É` sort after `Z`.
fn compare_names(a: &Track, b: &Track) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.path.cmp(&b.path))
}

/// Return `tracks` reordered by name. The input is left untouched.
pub fn sort_tracks(tracks: &[Track], direction: SortDirection) -> Vec<Track> {
    let mut sorted = tracks.to_vec();
    sorted.sort_by(compare_names);
    if direction == SortDirection::Descending {
        sorted.reverse();
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn t(name: &str, path: &str) -> Track {
        Track {
            name: name.into(),
            path: PathBuf::from(path),
            artist: None,
            album: None,
            cover_art_url: None,
        }
    }

    fn names(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn ascending_is_case_insensitive() {
        let tracks = vec![t("b.mp3", "/m/b"), t("C.mp3", "/m/c"), t("a.mp3", "/m/a")];
        let sorted = sort_tracks(&tracks, SortDirection::Ascending);
        assert_eq!(names(&sorted), vec!["a.mp3", "b.mp3", "C.mp3"]);
    }

    #[test]
    fn descending_is_exact_reverse_of_ascending() {
        let tracks = vec![
            t("Song.mp3", "/x/2"),
            t("song.mp3", "/x/1"),
            t("Song.mp3", "/x/3"),
            t("intro.mp3", "/x/4"),
        ];
        let mut asc = sort_tracks(&tracks, SortDirection::Ascending);
        let desc = sort_tracks(&tracks, SortDirection::Descending);
        asc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn sorting_twice_round_trips() {
        let tracks = vec![t("b.mp3", "/b"), t("a.mp3", "/a"), t("c.mp3", "/c")];
        let asc = sort_tracks(&tracks, SortDirection::Ascending);
        let back = sort_tracks(
            &sort_tracks(&asc, SortDirection::Descending),
            SortDirection::Ascending,
        );
        assert_eq!(asc, back);
        assert_eq!(sort_tracks(&asc, SortDirection::Ascending), asc);
    }

    #[test]
    fn accented_initials_follow_code_point_order() {
        let tracks = vec![t("Émile.mp3", "/m/e"), t("Zebra.mp3", "/m/z"), t("apple.mp3", "/m/a")];
        let sorted = sort_tracks(&tracks, SortDirection::Ascending);
        assert_eq!(names(&sorted), vec!["apple.mp3", "Zebra.mp3", "Émile.mp3"]);
    }

    #[test]
    fn sort_does_not_touch_input() {
        let tracks = vec![t("b.mp3", "/b"), t("a.mp3", "/a")];
        let _ = sort_tracks(&tracks, SortDirection::Ascending);
        assert_eq!(names(&tracks), vec!["b.mp3", "a.mp3"]);
    }
}
