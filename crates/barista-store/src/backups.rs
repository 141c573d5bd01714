//! Profile backup store.
//!
//! Backups are appended to a JSON array on disk. The array is capped: once
//! it holds [`BACKUP_CAP`] entries, the oldest entry is evicted on the next
//! save. Restore payloads are prepared by stripping server-assigned fields
//! and suffixing the title so the restored profile never collides with a
//! live one.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::StoreError;

/// Maximum number of backups kept on disk.
pub const BACKUP_CAP: usize = 50;

/// Default backup file name, relative to the working directory.
const DEFAULT_FILE: &str = "profile_backups.json";

/// Server-assigned profile fields stripped before a restore.
const SERVER_FIELDS: &[&str] = &[
    "id",
    "createdAt",
    "deletedAt",
    "lastUsedTime",
    "sharedFrom",
    "isDefaultProfile",
    "instantBrew",
    "folder",
    "duration",
    "lastGBQuantity",
];

/// One backed-up profile snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEntry {
    pub backed_up_at: DateTime<Utc>,
    /// The profile as it came from the cloud, server fields included.
    pub profile: Value,
}

/// File-backed FIFO store of profile backups.
#[derive(Debug, Clone)]
pub struct BackupStore {
    path: PathBuf,
}

impl BackupStore {
    /// Store backed by `profile_backups.json` in the working directory.
    pub fn new() -> Self {
        Self::at(DEFAULT_FILE)
    }

    /// Store backed by the given path.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load all backups, oldest first.
    ///
    /// A missing file is an empty store, not an error.
    pub async fn load(&self) -> Result<Vec<BackupEntry>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Number of backups on disk; unreadable stores count as empty.
    pub async fn count(&self) -> usize {
        match self.load().await {
            Ok(entries) => entries.len(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "could not read backups");
                0
            }
        }
    }

    /// Append a backup of `profile`, evicting the oldest entry past the cap.
    ///
    /// A corrupt backup file is replaced rather than poisoning every future
    /// save; the replaced content is logged.
    pub async fn save_backup(&self, profile: &Value) -> Result<(), StoreError> {
        let mut entries = match self.load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "backup file unreadable, starting fresh");
                Vec::new()
            }
        };

        entries.push(BackupEntry {
            backed_up_at: Utc::now(),
            profile: profile.clone(),
        });

        if entries.len() > BACKUP_CAP {
            let excess = entries.len() - BACKUP_CAP;
            entries.drain(..excess);
        }

        self.write(&entries).await
    }

    /// Fetch one backup by its index in the on-disk order (0 = oldest).
    pub async fn get(&self, index: usize) -> Result<BackupEntry, StoreError> {
        let entries = self.load().await?;
        entries
            .into_iter()
            .nth(index)
            .ok_or(StoreError::NoSuchBackup(index))
    }

    /// Atomic write: temp file then rename.
    async fn write(&self, entries: &[BackupEntry]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

impl Default for BackupStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the create payload for restoring a backup.
///
/// Strips every server-assigned field and appends a `_restored_<timestamp>`
/// suffix to the title so the restored copy is distinguishable from (and
/// cannot collide with) the original.
pub fn prepare_restore(entry: &BackupEntry, now: DateTime<Utc>) -> Value {
    let mut profile = entry.profile.clone();

    if let Some(map) = profile.as_object_mut() {
        for field in SERVER_FIELDS {
            map.remove(*field);
        }

        let original_title = map
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or("Restored Profile");
        let title = format!(
            "{}_restored_{}",
            original_title,
            now.format("%Y%m%d_%H%M%S")
        );
        map.insert("title".to_string(), Value::String(title));
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::tempdir;

    fn profile(n: usize) -> Value {
        json!({
            "id": format!("p-{}", n),
            "title": format!("Profile {}", n),
            "ratio": 16.0,
            "createdAt": "2025-01-01T00:00:00Z",
            "lastUsedTime": 1736000000000i64,
            "isDefaultProfile": false
        })
    }

    #[tokio::test]
    async fn missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = BackupStore::at(dir.path().join("profile_backups.json"));
        assert!(store.load().await.unwrap().is_empty());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn save_appends_in_order() {
        let dir = tempdir().unwrap();
        let store = BackupStore::at(dir.path().join("profile_backups.json"));

        store.save_backup(&profile(1)).await.unwrap();
        store.save_backup(&profile(2)).await.unwrap();

        let entries = store.load().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].profile["id"], "p-1");
        assert_eq!(entries[1].profile["id"], "p-2");
    }

    #[tokio::test]
    async fn fifo_eviction_at_cap() {
        let dir = tempdir().unwrap();
        let store = BackupStore::at(dir.path().join("profile_backups.json"));

        for n in 1..=(BACKUP_CAP + 1) {
            store.save_backup(&profile(n)).await.unwrap();
        }

        let entries = store.load().await.unwrap();
        assert_eq!(entries.len(), BACKUP_CAP);
        // The first save was evicted; the 51st is present and newest.
        assert!(entries.iter().all(|e| e.profile["id"] != "p-1"));
        assert_eq!(entries.last().unwrap().profile["id"], "p-51");
        assert_eq!(entries.first().unwrap().profile["id"], "p-2");
    }

    #[tokio::test]
    async fn corrupt_file_is_replaced_on_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile_backups.json");
        std::fs::write(&path, "not json").unwrap();

        let store = BackupStore::at(&path);
        assert!(store.load().await.is_err());
        assert_eq!(store.count().await, 0);

        store.save_backup(&profile(1)).await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[test]
    fn restore_strips_server_fields_and_suffixes_title() {
        let entry = BackupEntry {
            backed_up_at: Utc::now(),
            profile: profile(7),
        };
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

        let restored = prepare_restore(&entry, now);
        let map = restored.as_object().unwrap();

        for field in SERVER_FIELDS {
            assert!(!map.contains_key(*field), "field {} should be gone", field);
        }
        assert_eq!(
            restored["title"],
            "Profile 7_restored_20250314_092653"
        );
        assert_eq!(restored["ratio"], 16.0);
    }

    #[test]
    fn restore_handles_missing_title() {
        let entry = BackupEntry {
            backed_up_at: Utc::now(),
            profile: json!({"id": "x", "ratio": 15.0}),
        };
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

        let restored = prepare_restore(&entry, now);
        assert_eq!(
            restored["title"],
            "Restored Profile_restored_20250314_092653"
        );
    }

    mod laws {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(12))]

            // FIFO law: after n saves the store holds min(n, cap) entries,
            // the newest is save n, and the oldest is save n - len + 1.
            #[test]
            fn fifo_cap_holds_for_any_save_count(n in 1usize..70) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();

                rt.block_on(async {
                    let dir = tempdir().unwrap();
                    let store = BackupStore::at(dir.path().join("b.json"));
                    for i in 1..=n {
                        store.save_backup(&profile(i)).await.unwrap();
                    }

                    let entries = store.load().await.unwrap();
                    let expected_len = n.min(BACKUP_CAP);
                    prop_assert_eq!(entries.len(), expected_len);
                    let last_id = format!("p-{}", n);
                    prop_assert_eq!(
                        entries.last().unwrap().profile["id"].as_str().unwrap(),
                        last_id.as_str()
                    );
                    let first_id = format!("p-{}", n - expected_len + 1);
                    prop_assert_eq!(
                        entries.first().unwrap().profile["id"].as_str().unwrap(),
                        first_id.as_str()
                    );
                    Ok(())
                })?;
            }
        }
    }

    #[tokio::test]
    async fn get_by_index() {
        let dir = tempdir().unwrap();
        let store = BackupStore::at(dir.path().join("profile_backups.json"));
        store.save_backup(&profile(1)).await.unwrap();

        assert_eq!(store.get(0).await.unwrap().profile["id"], "p-1");
        assert!(matches!(
            store.get(5).await,
            Err(StoreError::NoSuchBackup(5))
        ));
    }
}
