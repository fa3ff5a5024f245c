//! The durable worry collection.
//!
//! All records live in one versioned document under a single backend key:
//!
//! ```json
//! { "schemaVersion": 1, "entries": [ { "id": "…", "title": "…", … } ] }
//! ```
//!
//! Nothing here returns an error to the caller. An unavailable backend turns
//! every operation into a no-op (empty reads, `false` writes). A corrupted
//! document is discarded and reported once through [`StoreNotice`]. Failed
//! writes are logged, reported, and surface as `false`, and a document that
//! could not be read is never overwritten.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::KeyValueBackend;
use crate::clock::Clock;
use crate::config::JournalConfig;
use crate::error::{BackendError, LoadError};
use crate::record::Worry;

/// Document version this build reads and writes.
pub const SCHEMA_VERSION: u32 = 1;

const PROBE_KEY: &str = "__storage_probe__";

const CORRUPTION_MESSAGE: &str = "We couldn't read your saved worries, so we started fresh.";

/// The persisted envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    pub schema_version: u32,
    #[serde(default)]
    pub entries: Vec<Worry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRef<'a> {
    schema_version: u32,
    entries: &'a [Worry],
}

/// Out-of-band conditions the shell reports to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreNotice {
    /// The stored document was unreadable and has been reset
    Corrupted { message: String },
    /// A write was attempted and the backend refused it
    WriteFailed { operation: &'static str },
}

/// Owns the worry collection on top of a key-value backend.
pub struct RecordStore {
    backend: Box<dyn KeyValueBackend>,
    clock: Arc<dyn Clock>,
    key: String,
    retention: TimeDelta,
    available: bool,
    /// Set while a corrupted document has been reported but is still stored.
    corruption_reported: AtomicBool,
    subscribers: Mutex<Vec<Sender<StoreNotice>>>,
}

impl RecordStore {
    /// Wrap a backend, probing it once to decide whether storage works at all.
    pub fn new(
        backend: impl KeyValueBackend + 'static,
        clock: Arc<dyn Clock>,
        config: &JournalConfig,
    ) -> Self {
        let available = probe(&backend);
        Self {
            backend: Box::new(backend),
            clock,
            key: config.storage_key.clone(),
            retention: config.retention(),
            available,
            corruption_reported: AtomicBool::new(false),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Result of the construction-time probe.
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Receive corruption and write-failure notices from now on.
    pub fn subscribe(&self) -> Receiver<StoreNotice> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Every stored worry, in document order.
    pub fn load_all(&self) -> Vec<Worry> {
        if !self.available {
            return Vec::new();
        }

        match self.read_entries() {
            Ok(entries) => entries,
            Err(LoadError::Backend(e)) => {
                tracing::warn!(error = %e, "Failed to read worries, showing none");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load worries");
                self.handle_corruption();
                Vec::new()
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<Worry> {
        self.load_all().into_iter().find(|w| w.id == id)
    }

    /// Insert or replace a worry by id.
    ///
    /// Stamps `updated_at` on the caller's copy; `created_at` is filled on
    /// first persistence and afterwards always taken from the stored entry.
    pub fn upsert(&self, worry: &mut Worry) -> bool {
        let now = self.clock.now();
        worry.updated_at = Some(now);
        let Some(mut entries) = self.entries_for_write("upsert") else {
            return false;
        };

        match entries.iter_mut().find(|w| w.id == worry.id) {
            Some(existing) => {
                worry.created_at = existing.created_at.or(worry.created_at).or(Some(now));
                *existing = worry.clone();
            }
            None => {
                worry.created_at = worry.created_at.or(Some(now));
                entries.push(worry.clone());
            }
        }

        self.save_all(&entries, "upsert")
    }

    /// Delete a worry. `false` when no worry had that id.
    pub fn remove(&self, id: &str) -> bool {
        let Some(entries) = self.entries_for_write("remove") else {
            return false;
        };
        let before = entries.len();
        let filtered: Vec<Worry> = entries.into_iter().filter(|w| w.id != id).collect();

        if filtered.len() == before {
            return false;
        }

        self.save_all(&filtered, "remove")
    }

    /// Drop content-less worries older than the retention window.
    ///
    /// Returns how many were dropped. Worries with any non-blank text are
    /// never dropped, whatever their age.
    pub fn cleanup_empty_worries(&self) -> usize {
        if !self.available {
            return 0;
        }

        let Some(cutoff) = self.clock.now().checked_sub_signed(self.retention) else {
            tracing::warn!(retention = %self.retention, "Retention window reaches before the calendar, keeping everything");
            return 0;
        };
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(LoadError::Backend(e)) => {
                tracing::warn!(error = %e, "Failed to read worries, skipping cleanup");
                return 0;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load worries");
                self.handle_corruption();
                return 0;
            }
        };
        let before = entries.len();

        let kept: Vec<Worry> = entries
            .into_iter()
            .filter(|worry| {
                if worry.has_content() {
                    return true;
                }
                if worry.created_at.is_some_and(|created| created > cutoff) {
                    return true;
                }
                tracing::debug!(id = %worry.id, created_at = ?worry.created_at, "Cleaning up empty worry");
                false
            })
            .collect();

        let dropped = before - kept.len();
        if dropped > 0 {
            self.save_all(&kept, "cleanup");
            tracing::info!("Cleaned up {} empty worries", dropped);
        }
        dropped
    }

    /// The current entries as the base of a rewrite.
    ///
    /// `None` means nothing may be written: storage is off, or the stored
    /// document exists but could not be read and would be lost. A corrupted
    /// document has already been discarded, so writing over it is fine.
    fn entries_for_write(&self, operation: &'static str) -> Option<Vec<Worry>> {
        if !self.available {
            tracing::warn!(operation, "Cannot save: storage is not available");
            return None;
        }

        match self.read_entries() {
            Ok(entries) => Some(entries),
            Err(LoadError::Backend(e)) => {
                tracing::error!(operation, error = %e, "Failed to read worries, refusing to overwrite them");
                self.notify(StoreNotice::WriteFailed { operation });
                None
            }
            Err(e) => {
                tracing::error!(operation, error = %e, "Failed to load worries");
                self.handle_corruption();
                Some(Vec::new())
            }
        }
    }

    fn read_entries(&self) -> Result<Vec<Worry>, LoadError> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(BackendError::InvalidData(_)) => return Err(LoadError::Encoding),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&raw).map_err(LoadError::Malformed)?;
        let version = value.get("schemaVersion").and_then(Value::as_u64);

        let entries = if version == Some(u64::from(SCHEMA_VERSION)) {
            let document: StoreDocument =
                serde_json::from_value(value).map_err(LoadError::Shape)?;
            document.entries
        } else {
            tracing::warn!(found = ?version, expected = SCHEMA_VERSION, "Schema version mismatch, migrating data");
            self.migrate(value, &raw)?
        };

        Ok(dedupe(entries))
    }

    /// Turn a document of another version into entries.
    ///
    /// A bare array is taken as the entry list. Any other shape is copied to
    /// a backup key and read as empty; the stored document is not rewritten.
    fn migrate(&self, value: Value, raw: &str) -> Result<Vec<Worry>, LoadError> {
        if value.is_array() {
            return serde_json::from_value(value).map_err(LoadError::Shape);
        }

        let backup_key = format!("{}.unmigrated", self.key);
        match self.backend.set(&backup_key, raw) {
            Ok(()) => tracing::warn!(backup = %backup_key, "Unrecognized legacy document, kept a copy and starting empty"),
            Err(e) => tracing::error!(error = %e, "Unrecognized legacy document and the backup copy failed"),
        }
        Ok(Vec::new())
    }

    /// Discard the stored document and tell subscribers, once per document.
    fn handle_corruption(&self) {
        let discarded = match self.backend.remove(&self.key) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to discard corrupted document");
                false
            }
        };
        let already_reported = self.corruption_reported.swap(!discarded, Ordering::SeqCst);
        if !already_reported {
            self.notify(StoreNotice::Corrupted {
                message: CORRUPTION_MESSAGE.to_string(),
            });
        }
    }

    fn save_all(&self, entries: &[Worry], operation: &'static str) -> bool {
        if !self.available {
            tracing::warn!("Cannot save: storage is not available");
            return false;
        }

        let document = DocumentRef {
            schema_version: SCHEMA_VERSION,
            entries,
        };
        let result = serde_json::to_string(&document)
            .map_err(|e| e.to_string())
            .and_then(|json| self.backend.set(&self.key, &json).map_err(|e| e.to_string()));

        match result {
            Ok(()) => {
                self.corruption_reported.store(false, Ordering::SeqCst);
                true
            }
            Err(e) => {
                tracing::error!(operation, error = %e, "Failed to save worries");
                self.notify(StoreNotice::WriteFailed { operation });
                false
            }
        }
    }

    fn notify(&self, notice: StoreNotice) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.retain(|tx| tx.send(notice.clone()).is_ok());
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("backend", &self.backend.name())
            .field("key", &self.key)
            .field("available", &self.available)
            .finish()
    }
}

fn probe(backend: &dyn KeyValueBackend) -> bool {
    let result = backend
        .set(PROBE_KEY, "test")
        .and_then(|()| backend.remove(PROBE_KEY));
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(backend = backend.name(), error = %e, "Storage is not available");
            false
        }
    }
}

/// Restore record invariants on freshly read entries: never-empty reason
/// lists and unique ids (first occurrence wins).
fn dedupe(entries: Vec<Worry>) -> Vec<Worry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter_map(|mut worry| {
            if !seen.insert(worry.id.clone()) {
                tracing::warn!(id = %worry.id, "Dropping duplicate worry id");
                return None;
            }
            worry.normalize();
            Some(worry)
        })
        .collect()
}
