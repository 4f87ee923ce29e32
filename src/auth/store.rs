use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credentials::Credentials;
use super::error::StoreError;

/// Storage abstraction for the persisted credential set.
///
/// The three conceptual entries (access token, refresh token, cached user)
/// are stored and cleared as one record, so no partial-clear state can be
/// observed by other readers.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credentials>, StoreError>;
    fn save(&self, credentials: &Credentials) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Configuration for file-backed credential storage.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_satchel_dir()
    }
}

/// File-backed credential store using a single TOML file.
///
/// # Example
/// ```no_run
/// use satchel::auth::{Credentials, CredentialStore, FileCredentialStore, StoreConfig};
///
/// let store = FileCredentialStore::new(StoreConfig::new(std::path::PathBuf::from("/tmp")));
/// let creds = Credentials::new("access").with_refresh_token("refresh");
/// store.save(&creds)?;
/// # Ok::<(), satchel::auth::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

const CREDENTIALS_FILE: &str = "credentials.toml";

impl FileCredentialStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_satchel_dir(),
        }
    }

    fn credentials_path(&self) -> PathBuf {
        self.base_dir.join(CREDENTIALS_FILE)
    }

    fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, StoreError> {
        let path = self.credentials_path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };
        let file: CredentialsFile = toml::from_str(&raw)?;
        Ok(Some(file.credentials))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let path = self.credentials_path();
        Self::ensure_parent(&path)?;
        let file = CredentialsFile {
            version: 1,
            credentials: credentials.clone(),
            saved_at: DateTime::<Utc>::from(std::time::SystemTime::now()),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let path = self.credentials_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialsFile {
    version: u32,
    credentials: Credentials,
    saved_at: DateTime<Utc>,
}

fn default_satchel_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".satchel"))
        .unwrap_or_else(|| PathBuf::from(".satchel"))
}
