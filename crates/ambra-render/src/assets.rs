//! Pluggable SH-HRIR asset store.
//!
//! Binaural filter banks are looked up by string key ("{order}OA_L" /
//! "{order}OA_R") and delivered as WAV bytes. Stores only serve
//! configuration-time loads.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;

/// Maps an asset key to WAV bytes.
pub trait HrirAssetStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
}

/// In-memory store, mainly for tests and embedding.
#[derive(Default)]
pub struct MemoryAssetStore {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(key.into(), bytes);
    }
}

impl HrirAssetStore for MemoryAssetStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.assets.get(key).cloned()
    }
}

/// Directory-backed store reading `{key}.wav` files, with a byte cache so
/// repeated DSP re-initializations do not re-read the disk.
pub struct DirectoryAssetStore {
    directory: PathBuf,
    cache: RwLock<HashMap<String, Vec<u8>>>,
}

impl DirectoryAssetStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }
}

impl HrirAssetStore for DirectoryAssetStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        if let Some(bytes) = self.cache.read().get(key) {
            return Some(bytes.clone());
        }
        let path = self.directory.join(format!("{key}.wav"));
        match std::fs::read(&path) {
            Ok(bytes) => {
                self.cache.write().insert(key.to_string(), bytes.clone());
                Some(bytes)
            }
            Err(_) => {
                log::warn!("asset \"{key}\" not found at {}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryAssetStore::new();
        store.insert("3OA_L", vec![1, 2, 3]);
        assert_eq!(store.get("3OA_L"), Some(vec![1, 2, 3]));
        assert_eq!(store.get("3OA_R"), None);
    }

    #[test]
    fn directory_store_reads_and_caches() {
        let dir = std::env::temp_dir().join("ambra_asset_store_test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("1OA_L.wav"), [7u8, 8, 9]).unwrap();

        let store = DirectoryAssetStore::new(&dir);
        assert_eq!(store.get("1OA_L"), Some(vec![7, 8, 9]));
        // Served from cache even after deletion.
        std::fs::remove_file(dir.join("1OA_L.wav")).unwrap();
        assert_eq!(store.get("1OA_L"), Some(vec![7, 8, 9]));
        assert_eq!(store.get("1OA_R"), None);
    }
}
