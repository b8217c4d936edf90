//! Durable storage for novels, chapters and their audit logs.
//!
//! This crate provides a trait-based storage system. The [`NovelStorage`] trait
//! is the novel metadata store, the chapter store and the history logs in one
//! interface; [`FilesystemStorage`] keeps everything as JSON documents on disk.

pub mod backends;
pub mod error;
pub mod traits;
pub mod types;

// Re-export the main interface and types for easy access
pub use backends::FilesystemStorage;
pub use error::{Result, StorageError};
pub use traits::NovelStorage;
pub use types::{NovelFilter, NovelSummary, NovelUpdate};
