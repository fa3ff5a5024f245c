//! Key-value persistence backends.
//!
//! The store talks to storage through [`KeyValueBackend`]: string keys,
//! string values, synchronous, and every call may fail.
//!
//! - [`MemoryBackend`]: in-memory map with switchable failure modes (tests)
//! - [`FileBackend`]: one file per key, written with the write-rename pattern

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::BackendError;

pub type BackendResult<T> = Result<T, BackendError>;

/// Pluggable string key-value storage.
pub trait KeyValueBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// Write a value, replacing whatever was there.
    fn set(&self, key: &str, value: &str) -> BackendResult<()>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> BackendResult<()>;
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> BackendResult<()> {
        (**self).remove(key)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory backend
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory backend.
///
/// `disabled` makes every call fail like storage turned off in a private
/// window; `reject_writes` makes only `set` fail like an exceeded quota.
/// Reads and removes can be failed on their own as well.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<HashMap<String, String>>,
    disabled: AtomicBool,
    reject_reads: AtomicBool,
    reject_writes: AtomicBool,
    reject_removes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every operation fails.
    pub fn disabled() -> Self {
        let backend = Self::default();
        backend.set_disabled(true);
        backend
    }

    /// Pre-populate one key.
    pub fn with_value(key: &str, value: &str) -> Self {
        let backend = Self::default();
        if let Ok(mut guard) = backend.data.write() {
            guard.insert(key.to_string(), value.to_string());
        }
        backend
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn set_reject_reads(&self, reject: bool) {
        self.reject_reads.store(reject, Ordering::SeqCst);
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn set_reject_removes(&self, reject: bool) {
        self.reject_removes.store(reject, Ordering::SeqCst);
    }

    /// Raw stored value, bypassing failure switches.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.data.read().ok()?.get(key).cloned()
    }

    fn check_enabled(&self) -> BackendResult<()> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("storage is disabled".into()));
        }
        Ok(())
    }
}

impl KeyValueBackend for MemoryBackend {
    fn name(&self) -> &str {
        "MemoryBackend"
    }

    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        self.check_enabled()?;
        if self.reject_reads.load(Ordering::SeqCst) {
            return Err(BackendError::Io(format!("read of {key} failed")));
        }
        let guard = self.data.read().map_err(|_| BackendError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        self.check_enabled()?;
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(BackendError::QuotaExceeded(key.to_string()));
        }
        let mut guard = self.data.write().map_err(|_| BackendError::Poisoned)?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> BackendResult<()> {
        self.check_enabled()?;
        if self.reject_removes.load(Ordering::SeqCst) {
            return Err(BackendError::Io(format!("remove of {key} failed")));
        }
        let mut guard = self.data.write().map_err(|_| BackendError::Poisoned)?;
        guard.remove(key);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File backend
// ─────────────────────────────────────────────────────────────────────────────

/// One file per key under a directory.
///
/// Writes go to `{file}.tmp`, are flushed and synced, then renamed over the
/// target so a crash never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// The directory does not need to exist; it is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// `<platform data dir>/<app_name>`, or the current directory as a last resort.
    pub fn default_for_app(app_name: &str) -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(app_name))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl KeyValueBackend for FileBackend {
    fn name(&self) -> &str {
        "FileBackend"
    }

    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let bytes = match fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| BackendError::InvalidData(key.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let mut tmp_path = path.clone();
        tmp_path.set_extension("json.tmp");

        let result = write_synced(&tmp_path, value).and_then(|()| fs::rename(&tmp_path, &path));
        if result.is_err() {
            // Never leave a partial temp file next to the real one.
            let _ = fs::remove_file(&tmp_path);
        }
        Ok(result?)
    }

    fn remove(&self, key: &str) -> BackendResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_synced(path: &Path, value: &str) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(value.as_bytes())?;
    writer.flush()?;
    writer.get_ref().sync_all()
}
