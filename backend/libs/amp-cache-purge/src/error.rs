//! Error types for AMP cache purge operations

use std::time::Duration;

use thiserror::Error;

use crate::purger::PurgeReport;

/// Private key could not be loaded.
///
/// Unrecoverable for the operation: no request is signed and no network call is made.
#[derive(Error, Debug)]
pub enum KeyLoadError {
    /// Key file missing or unreadable
    #[error("Failed to read private key at '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File content is not a PEM block
    #[error("Failed to decode PEM block: {0}")]
    Pem(String),

    /// Legacy PEM decryption failed (bad passphrase, unsupported cipher, missing headers)
    #[error("Failed to decrypt PEM block: {0}")]
    Decrypt(String),

    /// PEM block holds something other than an RSA private key
    #[error("Unexpected key type: {0}")]
    WrongKeyType(String),

    /// DER payload is not a valid PKCS#1 RSA private key
    #[error("Failed to parse PKCS#1 private key: {0}")]
    Parse(String),
}

/// RSA signing primitive rejected the digest
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("RSA signing failed: {0}")]
    Rsa(#[from] rsa::Error),
}

/// Outbound HTTP call failed before a response status was available
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Why a single variant purge did not succeed
#[derive(Error, Debug)]
pub enum PurgeFailure {
    #[error("unexpected status {0}")]
    Status(u16),

    #[error("unexpected response body {0:?}")]
    UnexpectedBody(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Operation-level purge error
#[derive(Error, Debug)]
pub enum PurgeError {
    /// Input is not an absolute URL with a host
    #[error("Failed to parse url: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    KeyLoad(#[from] KeyLoadError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// At least one attempted variant purge failed; siblings ran to completion
    #[error("Failed to purge {}: {}", .0.url, .0.describe_failures())]
    Purge(PurgeReport),
}

impl PurgeError {
    /// Per-variant results, when the operation got as far as dispatching purges
    pub fn report(&self) -> Option<&PurgeReport> {
        match self {
            PurgeError::Purge(report) => Some(report),
            _ => None,
        }
    }
}
