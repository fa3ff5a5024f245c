//! Identifier generation for new records.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Produces identifiers that are unique across the collection.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Predictable `<prefix>-<n>` identifiers for tests and fixtures.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuids_are_distinct() {
        let ids = UuidGenerator;
        assert_ne!(ids.generate(), ids.generate());
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new("worry");
        assert_eq!(ids.generate(), "worry-1");
        assert_eq!(ids.generate(), "worry-2");
    }
}
