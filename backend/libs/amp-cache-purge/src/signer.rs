//! RSA signing for AMP cache update requests
//!
//! Based on <https://developers.google.com/amp/cache/update-cache#rsa-keys>: the
//! signature is RSASSA-PKCS1-v1_5 over the SHA-256 digest of the request path, encoded
//! as unpadded base64url.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};

use crate::error::SigningError;

/// Sign `message` with PKCS#1 v1.5 over its SHA-256 digest.
///
/// PKCS#1 v1.5 is deterministic: the same message and key always give the same bytes.
pub fn sign(message: &[u8], key: &RsaPrivateKey) -> Result<Vec<u8>, SigningError> {
    let digest = Sha256::digest(message);
    let signature = key.sign(Pkcs1v15Sign::new::<Sha256>(), &digest)?;
    Ok(signature)
}

/// Encode a raw signature for embedding in a query string.
///
/// Standard base64 with `/` → `_`, `+` → `-` and padding stripped.
pub fn encode_signature(signature: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(signature)
}

/// Sign a purge path and return the URL-safe signature
pub fn sign_path(path: &str, key: &RsaPrivateKey) -> Result<String, SigningError> {
    let signature = sign(path.as_bytes(), key)?;
    Ok(encode_signature(&signature))
}
