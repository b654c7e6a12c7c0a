use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/audioflow/config.toml` or `~/.config/audioflow/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `AUDIOFLOW__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub cache: CacheSettings,
    pub playback: PlaybackSettings,
    pub log: LogSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Base directory the fixed root set is resolved against.
    /// `None` means the user's home directory.
    pub storage_root: Option<PathBuf>,
    /// Sub-paths of `storage_root` that are scanned, in order.
    /// An empty string stands for the storage root itself.
    pub root_subdirs: Vec<String>,
    /// Extra absolute roots scanned after the fixed set.
    pub extra_roots: Vec<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Walk each root on its own worker instead of one after another.
    pub parallel_roots: bool,
    /// Read artist/album tags when listing a folder's tracks.
    pub read_tags: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            storage_root: None,
            root_subdirs: [
                "",
                "Music",
                "Download",
                "Download/Music",
                "Download/Musik",
                "Downloads",
                "Downloads/Music",
                "Downloads/Musik",
                "Download/Rap",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            extra_roots: Vec::new(),
            extensions: vec!["mp3".into()],
            follow_links: true,
            include_hidden: true,
            parallel_roots: false,
            read_tags: true,
        }
    }
}

impl LibrarySettings {
    /// Extensions lowercased and stripped of leading dots; blanks removed.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    /// The ordered root list: `storage_root` joined with each of
    /// `root_subdirs`, followed by `extra_roots`.
    pub fn resolved_roots(&self) -> Vec<PathBuf> {
        let base = self
            .storage_root
            .clone()
            .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("/"));

        let mut roots: Vec<PathBuf> = self
            .root_subdirs
            .iter()
            .map(|sub| {
                let sub = sub.trim().trim_matches('/');
                if sub.is_empty() {
                    base.clone()
                } else {
                    base.join(sub)
                }
            })
            .collect();
        roots.extend(self.extra_roots.iter().cloned());
        roots
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Persist the folder catalog so later starts skip the scan.
    pub enabled: bool,
    /// Location of the key-value store file. `None` uses the cache dir.
    pub path: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl CacheSettings {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| super::default_cache_dir().map(|d| d.join("store.json")))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How often position/duration are sampled from the active track.
    pub progress_interval_ms: u64,
    /// Number of seconds to seek when pressing `H` / `L`.
    pub seek_step_seconds: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            progress_interval_ms: 1000,
            seek_step_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
    /// Log file. `None` writes `audioflow.log` into the cache dir.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

impl LogSettings {
    pub fn resolved_file(&self) -> Option<PathBuf> {
        self.file
            .clone()
            .or_else(|| super::default_cache_dir().map(|d| d.join("audioflow.log")))
    }
}

/// Log output format.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// Human-readable output.
    Pretty,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ audioflow ~ ".to_string(),
        }
    }
}
