// File: ./src/storage.rs
// JSON file backend for the event store
use crate::error::StoreError;
use crate::model::{OwnerId, StoredEvent};
use crate::store::MemoryStore;
use directories::ProjectDirs;
use fs2::FileExt;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DATA_DIR_ENV: &str = "CALIMPORT_DATA_DIR";
const EVENTS_FILE: &str = "events.json";

pub struct LocalStorage {
    dir: PathBuf,
}

/// Held for the duration of one import; released on drop.
pub struct OwnerLock {
    file: File,
    path: PathBuf,
}

impl Drop for OwnerLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!("Released owner lock {}", self.path.display());
    }
}

/// File name of an owner's lock. Characters outside `[A-Za-z0-9._-]` become
/// `_`, so distinct owners may share a lock but never escape the directory.
pub fn owner_lock_name(owner: &OwnerId) -> String {
    let safe: String = owner
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("owner_{}.lock", safe)
}

impl LocalStorage {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolution order: env var, configured dir, platform data dir.
    pub fn default_dir(configured: Option<&Path>) -> Option<PathBuf> {
        // ISOLATION: Check env var first
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            return Some(PathBuf::from(dir));
        }
        if let Some(dir) = configured {
            return Some(dir.to_path_buf());
        }
        ProjectDirs::from("com", "calimport", "calimport").map(|p| p.data_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn events_path(&self) -> PathBuf {
        self.dir.join(EVENTS_FILE)
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
        path: P,
        contents: C,
    ) -> Result<(), StoreError> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    fn lock_file(lock_path: &Path) -> Result<File, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path)?;
        file.lock_exclusive()
            .map_err(|e| StoreError::Lock(format!("{}: {}", lock_path.display(), e)))?;
        Ok(file)
    }

    /// Runs `f` while holding an exclusive lock on `<path>.lock`.
    pub fn with_lock<T, E, F>(path: &Path, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<StoreError>,
    {
        let lock_path = path.with_extension("lock");
        let file = Self::lock_file(&lock_path)?;
        let result = f();
        let _ = FileExt::unlock(&file);
        result
    }

    /// Serializes imports for one owner across processes.
    pub fn owner_lock(&self, owner: &OwnerId) -> Result<OwnerLock, StoreError> {
        self.ensure_dir()?;
        let path = self.dir.join(owner_lock_name(owner));
        let file = Self::lock_file(&path)?;
        debug!("Acquired owner lock {} for {}", path.display(), owner);
        Ok(OwnerLock { file, path })
    }

    fn load_internal(path: &Path) -> Result<Vec<StoredEvent>, StoreError> {
        if !path.exists() {
            return Ok(vec![]);
        }
        let json = fs::read_to_string(path)?;
        if json.trim().is_empty() {
            return Ok(vec![]);
        }
        Ok(serde_json::from_str(&json)?)
    }

    pub fn load(&self) -> Result<Vec<StoredEvent>, StoreError> {
        self.ensure_dir()?;
        let path = self.events_path();
        Self::with_lock(&path, || Self::load_internal(&path))
    }

    /// Lock -> Load -> Apply closure -> Save -> Unlock.
    /// Nothing is written when the closure fails.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut MemoryStore) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.ensure_dir()?;
        let path = self.events_path();
        Self::with_lock(&path, || {
            let mut store = MemoryStore::from_events(Self::load_internal(&path)?);
            let out = f(&mut store)?;
            let json = serde_json::to_string_pretty(store.events()).map_err(StoreError::from)?;
            Self::atomic_write(&path, json)?;
            debug!(
                "Committed {} events to {}",
                store.events().len(),
                path.display()
            );
            Ok(out)
        })
    }
}
