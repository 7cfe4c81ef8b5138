//! Passphrase sealing for the store file.
//!
//! Layout: `salt (32) || nonce (12) || AES-256-GCM(MAGIC || plaintext)`.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;
const KEY_LEN: usize = 32;
/// Checked after decryption to tell a wrong passphrase from valid data.
const MAGIC: &[u8] = b"OVULA_V1";

// Argon2id: 64 MiB, 3 passes, 1 lane.
const KDF_MEMORY_KIB: u32 = 64 * 1024;
const KDF_PASSES: u32 = 3;
const KDF_LANES: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key derivation failed")]
    KeyDerivation,
    #[error("encryption failed")]
    Encryption,
    #[error("decryption failed: wrong passphrase or corrupted data")]
    Decryption,
    #[error("invalid data format")]
    InvalidFormat,
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let params = Params::new(KDF_MEMORY_KIB, KDF_PASSES, KDF_LANES, Some(KEY_LEN))
        .map_err(|_| CryptoError::KeyDerivation)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
        .map_err(|_| CryptoError::KeyDerivation)?;
    Ok(key)
}

fn cipher_for(passphrase: &str, salt: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    let key = derive_key(passphrase, salt)?;
    Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CryptoError::KeyDerivation)
}

/// Seal `plaintext` under `passphrase` with a fresh salt and nonce.
pub fn seal(passphrase: &str, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut header = [0u8; HEADER_LEN];
    rand::thread_rng().fill_bytes(&mut header);
    let (salt, nonce) = header.split_at(SALT_LEN);

    let cipher = cipher_for(passphrase, salt)?;

    let mut payload = Zeroizing::new(Vec::with_capacity(MAGIC.len() + plaintext.len()));
    payload.extend_from_slice(MAGIC);
    payload.extend_from_slice(plaintext);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(nonce), payload.as_slice())
        .map_err(|_| CryptoError::Encryption)?;

    let mut sealed = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    sealed.extend_from_slice(&header);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open data produced by [`seal`]. A wrong passphrase and tampered data both
/// yield [`CryptoError::Decryption`].
pub fn open(passphrase: &str, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if sealed.len() < HEADER_LEN + MAGIC.len() {
        return Err(CryptoError::InvalidFormat);
    }
    let (salt, rest) = sealed.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let cipher = cipher_for(passphrase, salt)?;
    let decrypted = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decryption)?,
    );

    match decrypted.strip_prefix(MAGIC) {
        Some(plaintext) => Ok(Zeroizing::new(plaintext.to_vec())),
        None => Err(CryptoError::Decryption),
    }
}
