use std::fs;
use std::path::{Path, PathBuf};

use crate::crypto::{self, CryptoError};
use crate::models::AppData;

const DATA_FILE: &str = "data.ovula";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// True when the file could not be opened with the given passphrase.
    pub fn is_unreadable(&self) -> bool {
        matches!(
            self,
            StorageError::Crypto(CryptoError::Decryption | CryptoError::InvalidFormat)
        )
    }
}

/// Encrypted single-file store under a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(DATA_FILE)
    }

    /// Check if a data file exists (i.e., the tracker has been set up).
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Save app data encrypted with the given passphrase.
    pub fn save(&self, passphrase: &str, data: &AppData) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let json = zeroize::Zeroizing::new(serde_json::to_vec(data)?);
        let sealed = crypto::seal(passphrase, &json)?;

        // Replace atomically.
        let tmp = self.dir.join(format!("{DATA_FILE}.tmp"));
        fs::write(&tmp, sealed)?;
        fs::rename(&tmp, self.path())?;
        tracing::debug!(path = ?self.path(), "saved store");
        Ok(())
    }

    /// Load and decrypt app data with the given passphrase.
    pub fn load(&self, passphrase: &str) -> Result<AppData, StorageError> {
        let sealed = fs::read(self.path())?;
        let json = crypto::open(passphrase, &sealed)?;
        let data: AppData = serde_json::from_slice(&json)?;
        tracing::debug!(path = ?self.path(), "loaded store");
        Ok(data)
    }

    /// Delete all data permanently.
    pub fn wipe(&self) -> Result<(), StorageError> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::info!(?path, "wiped store");
        }
        Ok(())
    }
}
