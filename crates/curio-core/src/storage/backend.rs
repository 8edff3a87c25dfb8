//! Raw storage slot backends.
//!
//! The durable store reads and writes named document slots through the
//! `StorageBackend` trait. Production hosts use `FileBackend` (one file
//! per slot, atomic replace). `MemoryBackend` is the in-memory
//! implementation used by tests and ephemeral hosts; it can simulate
//! transient I/O failures and an exhausted quota.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{CurioError, Result};

/// Keyed whole-document storage.
///
/// Each slot holds one complete document; a write replaces the slot in
/// one step, never patches it. Implementations classify quota denials
/// as `CurioError::StorageFull` so callers can skip retries.
pub trait StorageBackend: Send + Sync {
    /// Read a slot.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(contents))` if the slot exists, `Ok(None)` if it
    /// was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Returns `CurioError::StorageFull` if the device refused the write
    /// for lack of space, `CurioError::Storage` for any other failure.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing an absent slot is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Map an I/O error, classifying out-of-space conditions as quota errors.
fn classify_io(err: io::Error) -> CurioError {
    if is_quota_error(&err) {
        CurioError::StorageFull(err.to_string())
    } else {
        CurioError::Storage(err.to_string())
    }
}

fn is_quota_error(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded
    ) {
        return true;
    }
    // Some platforms surface ENOSPC through a generic kind.
    let msg = err.to_string().to_lowercase();
    msg.contains("no space") || msg.contains("quota")
}

/// Replace `destination` with `temp_path` in one step.
///
/// On platforms where `fs::rename` refuses to overwrite an existing
/// target (notably Windows), the destination is removed and the rename
/// retried. The temp file is cleaned up if the rename still fails.
fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

/// Filesystem-backed slots: one file per key under a data directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open a backend rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(classify_io)?;
        Ok(Self { dir })
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(classify_io(err)),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CurioError::Storage(format!("System time error: {}", e)))?
            .as_nanos();
        let temp_path = self.dir.join(format!("{}.{}.tmp", key, nanos));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(classify_io)?;
        if let Err(err) = file.write_all(value.as_bytes()).and_then(|_| file.sync_all()) {
            let _ = fs::remove_file(&temp_path);
            return Err(classify_io(err));
        }

        rename_with_fallback(&temp_path, &path).map_err(classify_io)
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(classify_io(err)),
        }
    }
}

#[derive(Default)]
struct MemoryInner {
    slots: HashMap<String, String>,
    fail_gets: u32,
    fail_puts: u32,
    fail_puts_for: HashMap<String, u32>,
    quota_exceeded: bool,
    put_count: u64,
    put_attempts: u64,
}

/// In-memory slots with scripted failure injection.
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<MemoryInner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the slot table, returning an error if the mutex is poisoned.
    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| CurioError::Storage("Memory backend poisoned".to_string()))
    }

    /// Seed a slot directly, bypassing write bookkeeping.
    pub fn seed(&self, key: &str, value: &str) {
        if let Ok(mut inner) = self.lock() {
            inner.slots.insert(key.to_string(), value.to_string());
        }
    }

    /// Fail the next `count` reads with a transient error.
    pub fn fail_next_gets(&self, count: u32) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_gets = count;
        }
    }

    /// Fail the next `count` writes with a transient error.
    pub fn fail_next_puts(&self, count: u32) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_puts = count;
        }
    }

    /// Fail the next `count` writes to one slot, leaving other slots
    /// writable.
    pub fn fail_next_puts_for(&self, key: &str, count: u32) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_puts_for.insert(key.to_string(), count);
        }
    }

    /// Reject every write with a quota error until cleared.
    pub fn set_quota_exceeded(&self, exceeded: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.quota_exceeded = exceeded;
        }
    }

    /// Number of successful writes since construction.
    pub fn put_count(&self) -> u64 {
        self.lock().map(|inner| inner.put_count).unwrap_or(0)
    }

    /// Number of attempted writes, successful or not. Lets tests assert
    /// how often the retry schedule actually hit the backend.
    pub fn put_attempts(&self) -> u64 {
        self.lock().map(|inner| inner.put_attempts).unwrap_or(0)
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut inner = self.lock()?;
        if inner.fail_gets > 0 {
            inner.fail_gets -= 1;
            return Err(CurioError::Storage("Injected read failure".to_string()));
        }
        Ok(inner.slots.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.lock()?;
        inner.put_attempts += 1;
        if inner.quota_exceeded {
            return Err(CurioError::StorageFull(
                "Injected quota exceeded".to_string(),
            ));
        }
        if inner.fail_puts > 0 {
            inner.fail_puts -= 1;
            return Err(CurioError::Storage("Injected write failure".to_string()));
        }
        if let Some(remaining) = inner.fail_puts_for.get_mut(key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CurioError::Storage(format!(
                    "Injected write failure for {}",
                    key
                )));
            }
        }
        inner.put_count += 1;
        inner.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut inner = self.lock()?;
        inner.slots.remove(key);
        Ok(())
    }
}
