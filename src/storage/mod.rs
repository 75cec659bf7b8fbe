//! Storage port for all durable state.
//!
//! Every component depends on the [`Store`] trait rather than a concrete
//! backend, so the quiz/progress/certificate flow can run against the
//! in-memory fake in tests and the SQLite store in the app.

use anyhow::Result;

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Synchronous key-value port. Keys are namespaced strings (see [`keys`]);
/// values are serialized JSON. `list_keys` makes namespace enumeration a
/// first-class operation instead of an accident of key naming.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Key layout of the shared store.
pub mod keys {
    pub const COURSE_PROGRESS_PREFIX: &str = "course-progress:";
    pub const CERTIFICATE_PREFIX: &str = "certificate:";

    pub fn course_progress(course_id: &str) -> String {
        format!("{COURSE_PROGRESS_PREFIX}{course_id}")
    }

    pub fn certificate(certificate_id: &str) -> String {
        format!("{CERTIFICATE_PREFIX}{certificate_id}")
    }

    /// Strips the course-progress namespace, returning the course id.
    pub fn course_id_from_progress_key(key: &str) -> Option<&str> {
        key.strip_prefix(COURSE_PROGRESS_PREFIX)
    }
}
