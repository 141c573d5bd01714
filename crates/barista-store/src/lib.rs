//! Local JSON persistence for the dashboard and assistant.
//!
//! Two stores live here:
//!
//! - [`BackupStore`]: timestamped profile snapshots in
//!   `profile_backups.json`, capped at 50 entries with FIFO eviction
//! - [`Config`]: layered configuration resolution — environment variables,
//!   then a local secrets file, then (non-sensitive values only) a config
//!   file. Passwords and API keys are never written to the config file.

mod backups;
mod config;
mod error;

pub use backups::{BACKUP_CAP, BackupEntry, BackupStore, prepare_restore};
pub use config::{
    API_KEY_KEY, ASSISTANT_ID_KEY, Config, ConfigSource, EMAIL_KEY, PASSWORD_KEY, ValueSource,
};
pub use error::StoreError;
