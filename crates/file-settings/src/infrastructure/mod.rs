//! Infrastructure layer: OS-facing adapters.
//!
//! The only adapter is file-system storage.  It implements the
//! [`SettingsStore`](crate::application::store::SettingsStore) trait declared
//! by the application layer.

pub mod storage;
