//! Signing key loading and credential providers

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::RsaPrivateKey;
use tracing::{debug, error, info};

use crate::error::KeyLoadError;
use crate::legacy_pem;

const RSA_PRIVATE_KEY_TAG: &str = "RSA PRIVATE KEY";

/// Supplies the RSA key used to sign purge requests.
///
/// Called once per purge operation, before any network call.
pub trait CredentialProvider: Send + Sync {
    fn current_key(&self) -> Result<Arc<RsaPrivateKey>, KeyLoadError>;
}

/// Reads and parses the key file on every call
#[derive(Debug, Clone)]
pub struct FileKeyProvider {
    location: PathBuf,
    passphrase: String,
}

impl FileKeyProvider {
    pub fn new(location: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            passphrase: passphrase.into(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }
}

impl CredentialProvider for FileKeyProvider {
    fn current_key(&self) -> Result<Arc<RsaPrivateKey>, KeyLoadError> {
        load_private_key(&self.location, &self.passphrase).map(Arc::new)
    }
}

/// Loads through an inner provider once and reuses the key afterwards.
///
/// Failures are not cached; the next call tries again.
pub struct CachedKeyProvider<P> {
    inner: P,
    key: OnceCell<Arc<RsaPrivateKey>>,
}

impl<P: CredentialProvider> CachedKeyProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            key: OnceCell::new(),
        }
    }
}

impl<P: CredentialProvider> CredentialProvider for CachedKeyProvider<P> {
    fn current_key(&self) -> Result<Arc<RsaPrivateKey>, KeyLoadError> {
        self.key
            .get_or_try_init(|| {
                let key = self.inner.current_key()?;
                info!("Signing key loaded and cached");
                Ok(key)
            })
            .cloned()
    }
}

/// In-memory key, mostly for tests and embedders that manage key material themselves
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    key: Arc<RsaPrivateKey>,
}

impl StaticKeyProvider {
    pub fn new(key: RsaPrivateKey) -> Self {
        Self { key: Arc::new(key) }
    }

    pub fn from_pem(pem: &str, passphrase: &str) -> Result<Self, KeyLoadError> {
        parse_private_key_pem(pem.as_bytes(), passphrase).map(Self::new)
    }
}

impl CredentialProvider for StaticKeyProvider {
    fn current_key(&self) -> Result<Arc<RsaPrivateKey>, KeyLoadError> {
        Ok(self.key.clone())
    }
}

/// Load a PKCS#1 RSA private key from a PEM file, decrypting it when `passphrase` is set
pub fn load_private_key(location: &Path, passphrase: &str) -> Result<RsaPrivateKey, KeyLoadError> {
    debug!(location = %location.display(), "Loading private key");

    let raw = fs::read(location).map_err(|source| {
        error!(location = %location.display(), error = %source, "Failed to read private key");
        KeyLoadError::Read {
            path: location.display().to_string(),
            source,
        }
    })?;

    parse_private_key_pem(&raw, passphrase)
}

/// Parse PEM-encoded PKCS#1 RSA private key material
pub fn parse_private_key_pem(input: &[u8], passphrase: &str) -> Result<RsaPrivateKey, KeyLoadError> {
    let block = pem::parse(input).map_err(|e| KeyLoadError::Pem(e.to_string()))?;

    if block.tag() != RSA_PRIVATE_KEY_TAG {
        return Err(KeyLoadError::WrongKeyType(format!(
            "expected '{RSA_PRIVATE_KEY_TAG}' block, found '{}'",
            block.tag()
        )));
    }

    let encrypted = legacy_pem::is_encrypted(&block);
    let der = match (encrypted, passphrase.is_empty()) {
        (true, false) => legacy_pem::decrypt_block(&block, passphrase.as_bytes())?,
        (false, true) => block.contents().to_vec(),
        (true, true) => {
            return Err(KeyLoadError::Decrypt(
                "PEM block is encrypted but no passphrase is configured".into(),
            ))
        }
        (false, false) => {
            return Err(KeyLoadError::Decrypt(
                "passphrase configured but PEM block is not encrypted".into(),
            ))
        }
    };

    RsaPrivateKey::from_pkcs1_der(&der).map_err(|e| KeyLoadError::Parse(e.to_string()))
}
