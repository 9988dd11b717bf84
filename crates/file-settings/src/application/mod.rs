//! Application layer: the settings-file use cases.
//!
//! - **`settings_file`** – [`SettingsFile`](settings_file::SettingsFile)
//!   (`exists`, `create`, `load`) and the bound
//!   [`FileSettings`](settings_file::FileSettings) handle (`save`, `set`,
//!   `update`).
//!
//! - **`store`** – The [`SettingsStore`](store::SettingsStore) trait the use
//!   cases read and write through.  Depending on the trait rather than on
//!   `std::fs` lets tests inject failures without a real disk.

pub mod settings_file;
pub mod store;
