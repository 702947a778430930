//! Memoized dataset loading.
//!
//! A [`DatasetCache`] holds at most one cleaned [`Dataset`] per canonical
//! source path, together with the [`SourceFingerprint`] it was built from.
//! `get_or_load` hands back the cached `Arc` while the fingerprint is
//! unchanged and re-runs the loader otherwise.

use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufReader, Read},
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    dataset::Dataset,
    error::{InsightsError, Result},
    loader::{self, LoadOptions},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "kebab-case")]
pub enum FingerprintMode {
    /// File length and modification time.
    #[default]
    Metadata,
    /// SHA-256 of the file contents.
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFingerprint {
    Metadata {
        len: u64,
        modified: Option<SystemTime>,
    },
    Content(String),
}

impl SourceFingerprint {
    pub fn compute(path: &Path, mode: FingerprintMode) -> Result<Self> {
        match mode {
            FingerprintMode::Metadata => {
                let meta =
                    fs::metadata(path).map_err(|source| InsightsError::unavailable(path, source))?;
                Ok(SourceFingerprint::Metadata {
                    len: meta.len(),
                    modified: meta.modified().ok(),
                })
            }
            FingerprintMode::Content => {
                let file =
                    File::open(path).map_err(|source| InsightsError::unavailable(path, source))?;
                let mut reader = BufReader::new(file);
                let mut hasher = Sha256::new();
                let mut buffer = [0u8; 64 * 1024];
                loop {
                    let read = reader
                        .read(&mut buffer)
                        .map_err(|source| InsightsError::unavailable(path, source))?;
                    if read == 0 {
                        break;
                    }
                    hasher.update(&buffer[..read]);
                }
                Ok(SourceFingerprint::Content(hex::encode(hasher.finalize())))
            }
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    fingerprint: SourceFingerprint,
    dataset: Arc<Dataset>,
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, CacheEntry>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, options: &LoadOptions) -> Result<Arc<Dataset>> {
        let key = canonical_key(&options.source)?;
        let fingerprint = SourceFingerprint::compute(&key, options.fingerprint)?;
        match self.entries.get(&key) {
            Some(entry) if entry.fingerprint == fingerprint => {
                debug!("Reusing cached dataset for {key:?}");
                return Ok(Arc::clone(&entry.dataset));
            }
            Some(_) => info!("Source {key:?} changed; reloading"),
            None => {}
        }
        let dataset = Arc::new(loader::load(options)?);
        self.loads += 1;
        self.entries.insert(
            key,
            CacheEntry {
                fingerprint,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Forgets the dataset loaded from `path`. Returns whether one was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let key = canonical_key(path).unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        canonical_key(path)
            .map(|key| self.entries.contains_key(&key))
            .unwrap_or(false)
    }

    /// Number of times the loader has actually run.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

fn canonical_key(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|source| InsightsError::unavailable(path, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file.flush().expect("flush");
        file
    }

    const CSV: &str = "listing_id,latitude,longitude\nA1,-6.2,106.8\n";

    #[test]
    fn second_request_reuses_cached_dataset() {
        let file = source(CSV);
        let options = LoadOptions::new(file.path());
        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&options).expect("load");
        let second = cache.get_or_load(&options).expect("load");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.loads(), 1);
        assert!(cache.contains(file.path()));
    }

    #[test]
    fn content_change_forces_reload() {
        let mut file = source(CSV);
        let options = LoadOptions::new(file.path()).with_fingerprint(FingerprintMode::Content);
        let mut cache = DatasetCache::new();
        assert_eq!(cache.get_or_load(&options).expect("load").len(), 1);

        file.write_all(b"B2,-6.3,106.9\n").expect("append");
        file.flush().expect("flush");
        assert_eq!(cache.get_or_load(&options).expect("reload").len(), 2);
        assert_eq!(cache.loads(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn content_fingerprint_is_lowercase_sha256_hex() {
        let file = source("abc");
        let fingerprint =
            SourceFingerprint::compute(file.path(), FingerprintMode::Content).expect("digest");
        assert_eq!(
            fingerprint,
            SourceFingerprint::Content(
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".to_string()
            )
        );
    }

    #[test]
    fn invalidate_and_clear_drop_entries() {
        let file = source(CSV);
        let options = LoadOptions::new(file.path());
        let mut cache = DatasetCache::new();
        cache.get_or_load(&options).expect("load");
        assert!(cache.invalidate(file.path()));
        assert!(!cache.invalidate(file.path()));
        cache.get_or_load(&options).expect("load");
        assert_eq!(cache.loads(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_source_is_not_cached() {
        let mut cache = DatasetCache::new();
        let err = cache
            .get_or_load(&LoadOptions::new("/no/such/listings.csv"))
            .err()
            .expect("missing source");
        assert!(matches!(err, InsightsError::SourceUnavailable { .. }));
        assert!(cache.is_empty());
    }
}
