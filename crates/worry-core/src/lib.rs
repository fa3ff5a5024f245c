//! Worry Core - the engine behind the worry journal
//!
//! A worry journal keeps short entries: a worry, the reasons it might be
//! real, the evidence that it is not, and how the writer feels once both
//! sides are written down. This crate holds everything except the screen:
//!
//! - **Record**: the `Worry` model and its editing rules
//! - **Store**: versioned, corruption-tolerant persistence over a key-value backend
//! - **Router**: fragment routing with `:param` captures and first-match dispatch
//! - **Schedule**: the debounced autosave and the clock that drives it
//! - **Render**: node trees, patchable regions and the mounted surface
//! - **Views**: the index, the editor, and the delete confirmation
//! - **Shell**: wires the pieces together and reports storage trouble
//! - **Config**: journal settings loaded from TOML
//!
//! # Data flow
//!
//! ```text
//! location change → Router → Shell → view → RecordStore → backend
//!                                      ↓
//!                                   Surface ← front end paints it
//! ```

pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod id;
pub mod location;
pub mod record;
pub mod render;
pub mod router;
pub mod schedule;
pub mod shell;
pub mod store;
pub mod views;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{JournalConfig, DEFAULT_STORAGE_KEY};
pub use error::{BackendError, ConfigError, LoadError};
pub use id::{IdGenerator, SequentialIds, UuidGenerator};
pub use location::{Location, MemoryLocation};
pub use record::{Feeling, ReasonSide, Worry, WorryId};
pub use render::{Key, Node, Region, Surface, Trigger};
pub use router::{match_route, worry_path, Params, RouteMatch, Router};
pub use schedule::Debouncer;
pub use shell::{ActiveView, Shell, Toast};
pub use store::{RecordStore, StoreDocument, StoreNotice, SCHEMA_VERSION};
pub use views::{Action, ConfirmDialog, EditView, ListView, Outcome, UiEvent};

/// Returns the version of worry-core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
