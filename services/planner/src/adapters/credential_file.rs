//! services/planner/src/adapters/credential_file.rs
//!
//! This module contains the credential storage adapter, the concrete implementation of
//! the `CredentialStore` port. The single API key lives in one small file on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lesson_planner_core::ports::{CredentialStore, PortError, PortResult};
use tokio::fs;
use tracing::{debug, info};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that implements the `CredentialStore` port on top of a file.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a new `FileCredentialStore`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(action: &str, path: &Path, e: std::io::Error) -> PortError {
    PortError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

//=========================================================================================
// `CredentialStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> PortResult<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let key = contents.trim();
                if key.is_empty() {
                    Ok(None)
                } else {
                    debug!("Loaded stored credential from {}", self.path.display());
                    Ok(Some(key.to_string()))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", &self.path, e)),
        }
    }

    async fn save(&self, api_key: &str) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create", parent, e))?;
        }
        fs::write(&self.path, api_key.trim())
            .await
            .map_err(|e| storage_error("write", &self.path, e))?;
        restrict_permissions(&self.path)
            .await
            .map_err(|e| storage_error("protect", &self.path, e))?;

        info!("Stored credential at {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Removed stored credential");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileCredentialStore {
        FileCredentialStore::new(dir.path().join("nested").join("api_key"))
    }

    #[tokio::test]
    async fn missing_file_means_no_credential() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_then_load_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save("AIza-test-key\n").await.unwrap();

        // a fresh adapter sees what the previous process wrote
        let reopened = FileCredentialStore::new(store.path().to_path_buf());
        assert_eq!(reopened.load().await.unwrap().as_deref(), Some("AIza-test-key"));
    }

    #[tokio::test]
    async fn clear_removes_and_tolerates_absence() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save("key").await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn blank_file_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save("   ").await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stored_file_is_private_to_the_owner() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save("key").await.unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
