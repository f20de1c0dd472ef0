//! Storage abstractions for service layer
//!
//! Uploaded documents live on the local filesystem under the configured
//! upload directory; the database keeps only their paths.

pub mod file_store;

pub use file_store::{FileStore, StoredFile};
