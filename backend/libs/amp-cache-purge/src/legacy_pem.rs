//! RFC 1421 ("traditional" OpenSSL) PEM encryption
//!
//! Blocks carry `Proc-Type: 4,ENCRYPTED` and `DEK-Info: <cipher>,<hex iv>` headers.
//! The cipher key is derived with OpenSSL's `EVP_BytesToKey` (MD5, one round,
//! salt = first 8 bytes of the IV).

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockCipher, BlockDecryptMut, KeyInit, KeyIvInit};
use pem::Pem;

use crate::error::KeyLoadError;

const PROC_TYPE_ENCRYPTED: &str = "4,ENCRYPTED";
const SALT_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegacyCipher {
    DesCbc,
    DesEde3Cbc,
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
}

impl LegacyCipher {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "DES-CBC" => Some(Self::DesCbc),
            "DES-EDE3-CBC" => Some(Self::DesEde3Cbc),
            "AES-128-CBC" => Some(Self::Aes128Cbc),
            "AES-192-CBC" => Some(Self::Aes192Cbc),
            "AES-256-CBC" => Some(Self::Aes256Cbc),
            _ => None,
        }
    }

    fn key_len(&self) -> usize {
        match self {
            Self::DesCbc => 8,
            Self::DesEde3Cbc => 24,
            Self::Aes128Cbc => 16,
            Self::Aes192Cbc => 24,
            Self::Aes256Cbc => 32,
        }
    }

    fn block_len(&self) -> usize {
        match self {
            Self::DesCbc | Self::DesEde3Cbc => 8,
            _ => 16,
        }
    }
}

/// Whether the block declares legacy encryption
pub(crate) fn is_encrypted(block: &Pem) -> bool {
    block
        .headers()
        .get("Proc-Type")
        .map(|value| value.trim() == PROC_TYPE_ENCRYPTED)
        .unwrap_or(false)
}

/// Decrypt an encrypted block's contents with `passphrase`
pub(crate) fn decrypt_block(block: &Pem, passphrase: &[u8]) -> Result<Vec<u8>, KeyLoadError> {
    let dek_info = block
        .headers()
        .get("DEK-Info")
        .ok_or_else(|| KeyLoadError::Decrypt("no DEK-Info header in block".into()))?;

    let (cipher_name, iv_hex) = dek_info
        .split_once(',')
        .ok_or_else(|| KeyLoadError::Decrypt(format!("malformed DEK-Info header: {dek_info}")))?;

    let cipher = LegacyCipher::from_name(cipher_name.trim()).ok_or_else(|| {
        KeyLoadError::Decrypt(format!("unsupported cipher: {}", cipher_name.trim()))
    })?;

    let iv = hex::decode(iv_hex.trim())
        .map_err(|e| KeyLoadError::Decrypt(format!("malformed IV: {e}")))?;
    if iv.len() != cipher.block_len() {
        return Err(KeyLoadError::Decrypt(format!(
            "IV length {} does not match block size {}",
            iv.len(),
            cipher.block_len()
        )));
    }

    let data = block.contents();
    if data.is_empty() || data.len() % cipher.block_len() != 0 {
        return Err(KeyLoadError::Decrypt(
            "encrypted data is not a multiple of the block size".into(),
        ));
    }

    let key = derive_key(passphrase, &iv[..SALT_LEN], cipher.key_len());

    match cipher {
        LegacyCipher::DesCbc => cbc_decrypt::<des::Des>(&key, &iv, data),
        LegacyCipher::DesEde3Cbc => cbc_decrypt::<des::TdesEde3>(&key, &iv, data),
        LegacyCipher::Aes128Cbc => cbc_decrypt::<aes::Aes128>(&key, &iv, data),
        LegacyCipher::Aes192Cbc => cbc_decrypt::<aes::Aes192>(&key, &iv, data),
        LegacyCipher::Aes256Cbc => cbc_decrypt::<aes::Aes256>(&key, &iv, data),
    }
}

/// OpenSSL `EVP_BytesToKey` with MD5 and a single iteration
fn derive_key(passphrase: &[u8], salt: &[u8], key_len: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(key_len + 16);
    let mut previous: Vec<u8> = Vec::new();

    while key.len() < key_len {
        let mut ctx = md5::Context::new();
        ctx.consume(&previous);
        ctx.consume(passphrase);
        ctx.consume(salt);
        previous = ctx.compute().0.to_vec();
        key.extend_from_slice(&previous);
    }

    key.truncate(key_len);
    key
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, KeyLoadError>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| KeyLoadError::Decrypt("invalid key or IV length".into()))?
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        // Bad padding is the only signal a wrong passphrase gives
        .map_err(|_| KeyLoadError::Decrypt("incorrect passphrase".into()))
}
