//! Shared fixtures for the integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use worry_core::{
    JournalConfig, ManualClock, MemoryBackend, MemoryLocation, RecordStore, SequentialIds, Shell,
    Worry,
};

/// Fixed start time so relative ages are deterministic.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(epoch()))
}

/// A store over an in-memory backend the test keeps a handle on.
#[allow(dead_code)]
pub fn store() -> (RecordStore, Arc<MemoryBackend>, Arc<ManualClock>) {
    let backend = Arc::new(MemoryBackend::new());
    let clock = clock();
    let store = RecordStore::new(backend.clone(), clock.clone(), &JournalConfig::default());
    (store, backend, clock)
}

/// A shell over `backend`, already pumped once.
#[allow(dead_code)]
pub fn shell(backend: Arc<MemoryBackend>, location: MemoryLocation) -> (Shell, Arc<ManualClock>) {
    let clock = clock();
    let mut shell = Shell::new(
        JournalConfig::default(),
        backend,
        location,
        clock.clone(),
        SequentialIds::new("w"),
    );
    shell.pump();
    (shell, clock)
}

#[allow(dead_code)]
pub fn titled(id: &str, title: &str) -> Worry {
    let mut worry = Worry::blank(id);
    worry.title = title.to_string();
    worry
}
