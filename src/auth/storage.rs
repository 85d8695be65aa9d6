use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use casemind_core::{ApiError, SessionStorage};
use tracing::debug;

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`; the directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> ApiError {
    ApiError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

#[async_trait(?Send)]
impl SessionStorage for FileStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, ApiError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_error("read", &path, err)),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), ApiError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| storage_error("create", &self.dir, e))?;

        let path = self.path_for(key);
        tokio::fs::write(&path, value)
            .await
            .map_err(|e| storage_error("write", &path, e))?;

        // The record holds a bearer token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| storage_error("restrict", &path, e))?;
        }

        debug!(path = %path.display(), "Session record saved");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ApiError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error("remove", &path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_key_loads_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.load("casemind-auth").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_creates_directory() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("casemind"));

        storage.save("casemind-auth", "{\"token\":\"t\"}").await.unwrap();
        assert_eq!(
            storage.load("casemind-auth").await.unwrap().as_deref(),
            Some("{\"token\":\"t\"}")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.save("casemind-auth", "{}").await.unwrap();

        let mode = std::fs::metadata(storage.path_for("casemind-auth"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.save("casemind-auth", "{}").await.unwrap();

        storage.remove("casemind-auth").await.unwrap();
        storage.remove("casemind-auth").await.unwrap();
        assert!(!storage.path_for("casemind-auth").exists());
    }
}
