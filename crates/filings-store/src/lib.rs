#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// In-memory object store and record sink.
pub mod memory;
/// No-op object store.
pub mod noop;

/// SQLite-backed record sink.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the traits for convenience
pub use filings_core::{ObjectStore, RecordSink};

pub use memory::{InMemoryObjectStore, InMemoryRecordSink};
pub use noop::NoopObjectStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRecordSink;
