use crate::error::{credentials_error, AutofillResult};
use async_trait::async_trait;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Default location of the encrypted credentials file
pub const DEFAULT_CREDENTIALS_FILE: &str = ".credentials.encrypted";

const NONCE_LEN: usize = 12;

/// Portal login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Create credentials from an email and password
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Storage for the portal login
#[async_trait]
pub trait SecretStore: Send + Sync + 'static {
    /// Store the credentials, returning whether they were saved
    async fn save(&self, credentials: &Credentials) -> bool;

    /// The stored credentials, if any
    async fn load(&self) -> Option<Credentials>;

    /// Forget the stored credentials, returning whether nothing is left behind
    async fn delete(&self) -> bool;

    /// Whether credentials are stored
    async fn has_credentials(&self) -> bool {
        self.load().await.is_some()
    }
}

/// In-memory implementation of the secret store
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    credentials: RwLock<Option<Credentials>>,
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn save(&self, credentials: &Credentials) -> bool {
        if !credentials.is_complete() {
            warn!("Refusing to store empty credentials");
            return false;
        }

        let mut stored = self.credentials.write().await;
        *stored = Some(credentials.clone());
        info!("Stored credentials for {}", credentials.email);
        true
    }

    async fn load(&self) -> Option<Credentials> {
        self.credentials.read().await.clone()
    }

    async fn delete(&self) -> bool {
        self.credentials.write().await.take();
        true
    }
}

/// Secret store keeping the login in an encrypted file.
///
/// The file holds a random nonce followed by the ChaCha20-Poly1305 sealed
/// JSON of the credentials. The key is the SHA-256 digest of a passphrase.
/// On Unix the file is readable by its owner only.
pub struct EncryptedFileStore {
    path: PathBuf,
    cipher: ChaCha20Poly1305,
}

impl EncryptedFileStore {
    /// Create a store at `path` encrypted with `passphrase`
    pub fn new(path: impl Into<PathBuf>, passphrase: &str) -> AutofillResult<Self> {
        if passphrase.is_empty() {
            return Err(credentials_error("encryption passphrase must not be empty"));
        }

        let key = Sha256::digest(passphrase.as_bytes());
        Ok(Self {
            path: path.into(),
            cipher: ChaCha20Poly1305::new(Key::from_slice(key.as_slice())),
        })
    }

    /// Location of the credentials file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seal(&self, credentials: &Credentials) -> AutofillResult<Vec<u8>> {
        let plaintext = serde_json::to_vec(credentials)?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|_| credentials_error("failed to encrypt credentials"))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn open(&self, sealed: &[u8]) -> AutofillResult<Credentials> {
        if sealed.len() <= NONCE_LEN {
            return Err(credentials_error("credentials file is truncated"));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| credentials_error("credentials file could not be decrypted"))?;

        Ok(serde_json::from_slice(&plaintext)?)
    }

    async fn write(&self, credentials: &Credentials) -> AutofillResult<()> {
        let sealed = self.seal(credentials)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.path).await?;
        file.write_all(&sealed).await?;
        file.flush().await?;

        // mode only applies when the file is created
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        Ok(())
    }

    async fn read(&self) -> AutofillResult<Option<Credentials>> {
        let sealed = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        self.open(&sealed).map(Some)
    }

    async fn remove(&self) -> AutofillResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SecretStore for EncryptedFileStore {
    async fn save(&self, credentials: &Credentials) -> bool {
        if !credentials.is_complete() {
            warn!("Refusing to store empty credentials");
            return false;
        }

        match self.write(credentials).await {
            Ok(()) => {
                info!(
                    "Stored credentials for {} in {}",
                    credentials.email,
                    self.path.display()
                );
                true
            }
            Err(e) => {
                error!("Failed to write {}: {}", self.path.display(), e);
                false
            }
        }
    }

    async fn load(&self) -> Option<Credentials> {
        match self.read().await {
            Ok(credentials) => credentials,
            Err(e) => {
                error!("Failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    async fn delete(&self) -> bool {
        match self.remove().await {
            Ok(()) => {
                info!("Removed {}", self.path.display());
                true
            }
            Err(e) => {
                error!("Failed to remove {}: {}", self.path.display(), e);
                false
            }
        }
    }
}
