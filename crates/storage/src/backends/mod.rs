//! Backend implementations for the novel storage system.

pub mod filesystem;

// Re-export the main filesystem backend for convenience
pub use filesystem::FilesystemStorage;
