//! Date-partitioned append log over key-addressed object storage.
//!
//! The backing store offers per-key last-write-wins `get`/`put` and nothing
//! else, so appending is a read-merge-write cycle. [`LogAppender`] serializes
//! those cycles behind a process-wide [`WriteGate`] so overlapping appends in
//! one process never drop each other's records.

pub mod appender;
pub mod blob;
pub mod error;
pub mod gate;
pub mod partition;
pub mod reader;

pub use appender::LogAppender;
pub use blob::{BlobStore, FsStore, MemoryStore};
pub use error::{BlobError, BlobResult, StoreError};
pub use gate::{WriteGate, WritePermit};
pub use partition::day_key;
pub use reader::fetch_day_log;
