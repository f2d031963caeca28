//! String key-value persistence used for collection progress and settings.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

pub const PROGRESS_KEY: &str = "pq2_progress";
pub const NEW_BADGES_KEY: &str = "pq2_new_badges";
pub const SOUND_KEY: &str = "pq2_sound";
pub const ANIMATION_KEY: &str = "pq2_animation";
pub const TUTORIAL_KEY: &str = "pq2_tutorial_shown";

pub const LEGACY_PROGRESS_KEY: &str = "pq4_progress";
pub const LEGACY_STATE_KEY: &str = "pq4";

/// Every key removed by a full progress reset.
pub const RESET_KEYS: [&str; 5] = [
    PROGRESS_KEY,
    NEW_BADGES_KEY,
    TUTORIAL_KEY,
    LEGACY_PROGRESS_KEY,
    LEGACY_STATE_KEY,
];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage is unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("failed to access stored key {key}: {source}")]
    Io {
        key: String,
        source: std::io::Error,
    },
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unavailable { reason: left }, Self::Unavailable { reason: right }) => {
                left == right
            }
            (Self::Io { key: left, .. }, Self::Io { key: right, .. }) => left == right,
            (Self::Encode { key: left, .. }, Self::Encode { key: right, .. }) => left == right,
            _ => false,
        }
    }
}

impl Eq for StoreError {}

/// Abstract string store, modelled on browser `localStorage`.
///
/// Implementations shared between several writers must serialize their
/// writes themselves; callers assume last-write-wins per key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store keeping one file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.data_dir).map_err(io_error)?;
        fs::write(self.path_for(key), value).map_err(io_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Copies progress saved under the legacy key when no current progress exists.
///
/// Returns whether a migration happened. Failures are logged and reported as
/// `false`; a failed migration never blocks startup.
pub fn migrate_legacy_keys<S: KeyValueStore + ?Sized>(store: &mut S) -> bool {
    let legacy = match (store.get(LEGACY_PROGRESS_KEY), store.get(PROGRESS_KEY)) {
        (Ok(Some(legacy)), Ok(None)) => legacy,
        (Err(error), _) | (_, Err(error)) => {
            warn!("legacy progress migration skipped: {error}");
            return false;
        }
        _ => return false,
    };

    match store.set(PROGRESS_KEY, &legacy) {
        Ok(()) => {
            info!("migrated {LEGACY_PROGRESS_KEY} to {PROGRESS_KEY}");
            true
        }
        Err(error) => {
            warn!("legacy progress migration failed: {error}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_values() {
        let mut store = MemoryStore::new();
        store.set("k", "v").expect("set succeeds");
        assert_eq!(store.get("k"), Ok(Some("v".to_string())));

        store.remove("k").expect("remove succeeds");
        assert_eq!(store.get("k"), Ok(None));
    }

    #[test]
    fn file_store_creates_directory_on_first_write() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let mut store = FileStore::new(root.path().join("nested").join("data"));

        assert_eq!(store.get(SOUND_KEY), Ok(None));
        store.set(SOUND_KEY, "false").expect("write succeeds");
        assert_eq!(store.get(SOUND_KEY), Ok(Some("false".to_string())));

        store.remove(SOUND_KEY).expect("remove succeeds");
        store.remove(SOUND_KEY).expect("removing twice is fine");
        assert_eq!(store.get(SOUND_KEY), Ok(None));
    }

    #[test]
    fn file_store_reports_unwritable_directory() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let blocker = root.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("file should be written");

        let mut store = FileStore::new(&blocker);
        let error = store
            .set(PROGRESS_KEY, "{}")
            .expect_err("cannot create a directory over a file");

        assert!(matches!(error, StoreError::Io { ref key, .. } if key == PROGRESS_KEY));
    }

    #[test]
    fn migrates_legacy_progress_once() {
        let mut store = MemoryStore::new();
        store
            .set(LEGACY_PROGRESS_KEY, r#"{"1":{"title":true}}"#)
            .expect("set succeeds");

        assert!(migrate_legacy_keys(&mut store));
        assert_eq!(
            store.get(PROGRESS_KEY),
            Ok(Some(r#"{"1":{"title":true}}"#.to_string()))
        );

        assert!(!migrate_legacy_keys(&mut store));
    }

    #[test]
    fn migration_never_overwrites_current_progress() {
        let mut store = MemoryStore::new();
        store.set(LEGACY_PROGRESS_KEY, "old").expect("set succeeds");
        store.set(PROGRESS_KEY, "new").expect("set succeeds");

        assert!(!migrate_legacy_keys(&mut store));
        assert_eq!(store.get(PROGRESS_KEY), Ok(Some("new".to_string())));
    }
}
