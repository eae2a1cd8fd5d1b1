//! Persisted key-value record for the timer

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    error::StorageError,
    state::{StoredState, TimerState},
};

/// Best-effort store for the last known timer state
pub trait Storage: Send + Sync {
    /// Read the persisted record; absent fields stay `None`
    fn load(&self) -> Result<StoredState, StorageError>;

    /// Overwrite the persisted record with the full state
    fn save(&self, state: &TimerState) -> Result<(), StorageError>;
}

/// Read the persisted state with per-field fallback, logging unreadable records
pub fn load_or_default(storage: &dyn Storage) -> TimerState {
    match storage.load() {
        Ok(stored) => TimerState::from_stored(&stored),
        Err(e) => {
            warn!("Failed to read timer state, using defaults: {}", e);
            TimerState::new()
        }
    }
}

/// Write the state, logging instead of propagating failures
pub fn save_best_effort(storage: &dyn Storage, state: &TimerState) {
    if let Err(e) = storage.save(state) {
        warn!("Failed to persist timer state: {}", e);
    }
}

/// JSON file holding the three persisted fields
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<StoredState, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No timer state at {}, starting fresh", self.path.display());
                return Ok(StoredState::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, state: &TimerState) -> Result<(), StorageError> {
        static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .path
            .with_extension(format!("json.{}.{}.tmp", std::process::id(), seq));
        fs::write(&tmp, serde_json::to_vec(state)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Wraps a blocking store so `save` returns at once.
///
/// The latest state is handed to a writer task that persists it off the async
/// threads; intermediate states may be skipped. `load` answers from the latest
/// unsaved state so readers in this process never see an older record.
pub struct WriteBehindStorage {
    inner: Arc<dyn Storage>,
    pending: watch::Sender<Option<TimerState>>,
}

impl WriteBehindStorage {
    /// Start the writer task. Must be called inside a tokio runtime.
    pub fn spawn(inner: Arc<dyn Storage>) -> Self {
        let (pending, mut rx) = watch::channel(None);
        let writer = Arc::clone(&inner);

        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let Some(state) = *rx.borrow_and_update() else {
                    continue;
                };
                let storage = Arc::clone(&writer);
                match tokio::task::spawn_blocking(move || storage.save(&state)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("Failed to persist timer state: {}", e),
                    Err(e) => warn!("Timer state writer failed: {}", e),
                }
            }
            debug!("Timer state writer exiting");
        });

        Self { inner, pending }
    }
}

impl Storage for WriteBehindStorage {
    fn load(&self) -> Result<StoredState, StorageError> {
        if let Some(state) = *self.pending.borrow() {
            return Ok(StoredState::from(state));
        }
        self.inner.load()
    }

    fn save(&self, state: &TimerState) -> Result<(), StorageError> {
        self.pending.send_replace(Some(*state));
        Ok(())
    }
}

/// In-process store, used when no file is wanted and in tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    record: Mutex<StoredState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an arbitrary, possibly partial record
    pub fn with_record(record: StoredState) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<StoredState, StorageError> {
        Ok(self
            .record
            .lock()
            .map(|record| record.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()))
    }

    fn save(&self, state: &TimerState) -> Result<(), StorageError> {
        let mut record = self
            .record
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *record = StoredState::from(*state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_empty_record() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("state.json"));
        assert_eq!(storage.load().unwrap(), StoredState::default());
        assert_eq!(load_or_default(&storage), TimerState::new());
    }

    #[test]
    fn saved_state_is_read_back() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("state.json"));
        let state = TimerState {
            time_left: 33,
            is_running: true,
            completed_cycles: 4,
        };
        storage.save(&state).unwrap();
        assert_eq!(load_or_default(&storage), state);
    }

    #[test]
    fn partial_file_falls_back_per_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"completedCycles": 9}"#).unwrap();
        let state = load_or_default(&JsonFileStorage::new(path));
        assert_eq!(state.completed_cycles, 9);
        assert_eq!(state.time_left, 120);
        assert!(!state.is_running);
    }

    #[test]
    fn corrupt_file_is_an_error_but_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ nope").unwrap();
        let storage = JsonFileStorage::new(path);
        assert!(matches!(storage.load(), Err(StorageError::Json(_))));
        assert_eq!(load_or_default(&storage), TimerState::new());
    }

    #[test]
    fn saves_leave_no_temp_files_behind() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("state.json"));
        for time_left in [3, 2, 1] {
            let state = TimerState {
                time_left,
                ..TimerState::new()
            };
            storage.save(&state).unwrap();
        }
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);
        assert_eq!(load_or_default(&storage).time_left, 1);
    }

    #[tokio::test]
    async fn write_behind_reads_latest_and_reaches_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let storage = WriteBehindStorage::spawn(Arc::new(JsonFileStorage::new(&path)));
        assert_eq!(load_or_default(&storage), TimerState::new());

        let state = TimerState {
            time_left: 17,
            is_running: true,
            completed_cycles: 1,
        };
        storage.save(&state).unwrap();
        assert_eq!(load_or_default(&storage), state);

        let on_disk = JsonFileStorage::new(&path);
        let written = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                if load_or_default(&on_disk) == state {
                    return;
                }
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(written.is_ok());
    }

    #[test]
    fn memory_storage_keeps_last_write() {
        let storage = MemoryStorage::new();
        let state = TimerState {
            time_left: 1,
            is_running: false,
            completed_cycles: 2,
        };
        storage.save(&state).unwrap();
        assert_eq!(load_or_default(&storage), state);
    }
}
