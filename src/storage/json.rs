use std::{
    fs::{self, OpenOptions, rename, write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde_json::to_string_pretty;
use uuid::Uuid;

use crate::{
    models::store::Store,
    storage::{Storage, StorageError},
};

const BACKUPS_TO_KEEP: usize = 5;

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn backup_dir(&self) -> PathBuf {
        let parent = self.path.parent().unwrap_or(Path::new("."));
        parent.join("backups")
    }

    fn backup_path(&self) -> PathBuf {
        let timestamp = jiff::Timestamp::now().to_string();
        let filename = format!("{:?}-{}", self.path.file_name(), timestamp);
        self.backup_dir().join(filename)
    }

    fn create_backup_dir(&self) -> Result<(), StorageError> {
        let backups_dir = self.backup_dir();
        fs::create_dir(&backups_dir).map_err(|e| StorageError::BackupFailed {
            path: backups_dir,
            source: e,
        })?;
        Ok(())
    }

    /// Copies the current store file into the backups directory. Nothing
    /// to do on the very first save.
    fn create_backup(&self) -> Result<u64, StorageError> {
        let file_exists = fs::exists(&self.path).map_err(|e| StorageError::BackupFailed {
            path: self.path.clone(),
            source: e,
        })?;
        if !file_exists {
            return Ok(0);
        }

        let backup_path = self.backup_path();
        match fs::copy(&self.path, &backup_path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.create_backup_dir()?;
                self.create_backup()
            }
            Err(e) => Err(StorageError::BackupFailed {
                path: backup_path,
                source: e,
            }),
            Ok(bytes) => Ok(bytes),
        }
    }

    /// Keeps the newest BACKUPS_TO_KEEP backups, deleting the rest. Backup
    /// filenames embed an RFC 3339 timestamp, so a lexical sort is a
    /// chronological sort.
    fn cleanup_old_backups(&self) -> Result<(), StorageError> {
        let backup_dir = self.backup_dir();
        let dir_exists = fs::exists(&backup_dir).map_err(|e| StorageError::CleanupFailed {
            dir: backup_dir.clone(),
            source: e,
        })?;
        if !dir_exists {
            return Ok(());
        }

        let mut backups = fs::read_dir(&backup_dir)
            .map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();

        backups.sort();

        let excess = backups.len().saturating_sub(BACKUPS_TO_KEEP);
        for stale in &backups[0..excess] {
            fs::remove_file(stale).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        }

        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Store, StorageError> {
        use crate::models::store::CURRENT_VERSION;
        use crate::storage::migrations::{apply_migrations, detect_version};

        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let file_version = detect_version(&content)?;

                if file_version > CURRENT_VERSION {
                    return Err(StorageError::FutureVersion(file_version));
                }

                let mut data: serde_json::Value =
                    serde_json::from_str(&content).map_err(|e| StorageError::ParseFailed {
                        path: self.path.clone(),
                        source: e,
                    })?;

                if file_version < CURRENT_VERSION {
                    data = apply_migrations(data, file_version, CURRENT_VERSION)?;
                }

                if let Some(obj) = data.as_object_mut() {
                    obj.insert("version".to_string(), serde_json::json!(CURRENT_VERSION));
                }

                let store: Store =
                    serde_json::from_value(data).map_err(|e| StorageError::ParseFailed {
                        path: self.path.clone(),
                        source: e,
                    })?;
                Ok(store)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Store::default()),
            Err(e) => Err(StorageError::LoadFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        let json =
            to_string_pretty(store).map_err(|e| StorageError::SerializeFailed { source: e })?;

        // Write to a unique temp file, then swap it in atomically under an
        // exclusive lock so concurrent invocations cannot interleave saves.
        let unique_temp = format!("{}.tmp.{}", self.path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        write(&temp_path, json).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        let lock_file_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            })?;

        self.create_backup()?;
        self.cleanup_old_backups()?;

        rename(&temp_path, &self.path).map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::{package::BiddingPackage, project::Project, store::Store};

    #[test]
    fn test_save_and_load_round_trip() {
        let project = Project {
            code: String::from("INV-2025-001"),
            name: String::from("Data center migration"),
            ..Project::default()
        };
        let package = BiddingPackage {
            code: String::from("GT-2025-001"),
            title: String::from("Hardware procurement"),
            project_id: project.id,
            ..BiddingPackage::default()
        };
        let store = Store {
            version: 1,
            projects: Vec::from([project]),
            packages: Vec::from([package]),
        };

        let storage = JsonFileStorage::new(PathBuf::from("/tmp/procman_test_store.json"));
        storage.save(&store).expect("save should succeed");

        let loaded = storage.load().expect("load should succeed");
        assert_eq!(loaded.projects[0].id, store.projects[0].id);
        assert_eq!(loaded.projects[0].code, "INV-2025-001");
        assert_eq!(loaded.packages[0].project_id, store.projects[0].id);
    }

    #[test]
    fn test_load_missing_file_yields_default_store() {
        let storage = JsonFileStorage::new(PathBuf::from("/tmp/procman_missing_store.json"));
        let store = storage.load().expect("missing file should not be an error");
        assert!(store.projects.is_empty());
        assert!(store.packages.is_empty());
    }

    #[test]
    fn test_load_invalid_json() {
        let path = PathBuf::from("/tmp/procman_invalid_store.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let storage = JsonFileStorage::new(path);
        let result = storage.load();

        match result {
            Err(StorageError::ParseFailed { .. }) => {}
            _ => panic!("Expected ParseFailed error, got something else"),
        }
    }

    #[test]
    fn test_load_v1_without_version_field() {
        let path = PathBuf::from("/tmp/procman_v1_store.json");
        let old_json = r#"{
            "projects": [],
            "packages": []
        }"#;
        fs::write(&path, old_json).unwrap();

        let storage = JsonFileStorage::new(path);
        let store = storage.load().expect("v1 file without version should load");
        assert_eq!(store.version, crate::models::store::CURRENT_VERSION);
    }

    #[test]
    fn test_load_future_version() {
        let path = PathBuf::from("/tmp/procman_future_store.json");
        let future_json = r#"{
            "version": 999,
            "projects": [],
            "packages": []
        }"#;
        fs::write(&path, future_json).unwrap();

        let storage = JsonFileStorage::new(path);
        match storage.load() {
            Err(StorageError::FutureVersion(999)) => {}
            _ => panic!("Expected FutureVersion(999) error"),
        }
    }

    #[test]
    fn test_backup_retention() {
        let test_dir = PathBuf::from("/tmp/procman_backup_test");
        let _ = fs::remove_dir_all(&test_dir);
        fs::create_dir_all(&test_dir).unwrap();

        let storage = JsonFileStorage::new(test_dir.join("store.json"));

        for i in 1..=8 {
            let mut store = Store::default();
            store.version = i;
            storage.save(&store).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        let backup_count = fs::read_dir(test_dir.join("backups"))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .count();

        assert_eq!(backup_count, BACKUPS_TO_KEEP, "Should keep exactly {BACKUPS_TO_KEEP} backups");

        fs::remove_dir_all(&test_dir).unwrap();
    }

    #[test]
    fn test_backup_dir_appears_on_second_save() {
        let test_dir = PathBuf::from("/tmp/procman_backup_dir_test");
        let _ = fs::remove_dir_all(&test_dir);
        fs::create_dir_all(&test_dir).unwrap();

        let storage = JsonFileStorage::new(test_dir.join("store.json"));
        let backups_dir = test_dir.join("backups");

        storage.save(&Store::default()).unwrap();
        assert!(
            !backups_dir.exists(),
            "Nothing to back up on the first save"
        );

        storage.save(&Store::default()).unwrap();
        assert!(backups_dir.is_dir(), "Second save should create a backup");

        fs::remove_dir_all(&test_dir).unwrap();
    }
}
