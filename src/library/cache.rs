//! Persistence of the folder catalog in a small key-value store.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::CacheError;

use super::model::Catalog;

/// The single key the catalog is stored under.
pub const CATALOG_KEY: &str = "folders";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), CacheError>;
}

/// A JSON object on disk, one string value per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, CacheError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), CacheError> {
        // A store that no longer parses is replaced rather than left stuck.
        let mut all = match self.read_all() {
            Ok(all) => all,
            Err(CacheError::Json(e)) => {
                tracing::warn!(store = %self.path.display(), error = %e, "cache store unreadable, rewriting it");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        all.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash never leaves a truncated store behind.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&all)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// The cached catalog, if one was stored.
pub fn load_catalog<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<Catalog>, CacheError> {
    match store.get(CATALOG_KEY)? {
        Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
        None => Ok(None),
    }
}

pub fn save_catalog<S: KeyValueStore + ?Sized>(
    store: &mut S,
    catalog: &Catalog,
) -> Result<(), CacheError> {
    store.set(CATALOG_KEY, serde_json::to_string(catalog)?)
}
