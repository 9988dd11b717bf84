//! Storage infrastructure: settings file persistence.
//!
//! [`FsStore`] is a thin adapter between the settings-file use cases and
//! `std::fs`.  It knows nothing about JSON or schemas; it moves text to and
//! from a path and creates missing parent directories on write.

pub mod file_store;

pub use file_store::FsStore;
