// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Machine-scoped secret cipher for the SMTP password blob (spec §4.G,
//! §9 Open Questions).
//!
//! The original system used Windows DPAPI (`CryptProtectData` with
//! `CRYPTPROTECT_LOCAL_MACHINE`), which is unavailable off Windows. This
//! crate targets the same hosts the vendor binary runs on, but the daemon
//! itself needs to build and test on macOS/Linux dev machines too, so the
//! DPAPI call is replaced with AES-256-GCM under a key derived from a
//! machine identifier — "machine-scoped" in spirit, portable in practice.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum SecretCipherError {
    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("decryption failed: {0}")]
    Decrypt(String),

    #[error("ciphertext too short to contain a nonce")]
    Truncated,
}

/// Derive a 256-bit key from a machine identifier. Not a general-purpose
/// KDF: the identifier itself is the only secret input, matching DPAPI's
/// machine-scope (any process on this host can decrypt).
fn derive_key(machine_id: &str) -> Key<Aes256Gcm> {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(machine_id.as_bytes());
    *Key::<Aes256Gcm>::from_slice(digest.as_slice())
}

/// Best-effort stable machine identifier: hostname, falling back to a
/// fixed string so encryption still works (with reduced host-scoping) in
/// containers without one.
pub fn machine_id() -> String {
    hostname::get().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|_| "robosched-host".into())
}

pub fn encrypt(plaintext: &str) -> Result<Vec<u8>, SecretCipherError> {
    encrypt_with_machine_id(plaintext, &machine_id())
}

pub fn encrypt_with_machine_id(plaintext: &str, machine_id: &str) -> Result<Vec<u8>, SecretCipherError> {
    let cipher = Aes256Gcm::new(&derive_key(machine_id));
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher.encrypt(nonce, plaintext.as_bytes()).map_err(|e| SecretCipherError::Encrypt(e.to_string()))?;
    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

pub fn decrypt_to_string(blob: &[u8]) -> Result<String, SecretCipherError> {
    decrypt_with_machine_id(blob, &machine_id())
}

pub fn decrypt_with_machine_id(blob: &[u8], machine_id: &str) -> Result<String, SecretCipherError> {
    if blob.len() < NONCE_LEN {
        return Err(SecretCipherError::Truncated);
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(&derive_key(machine_id));
    let nonce = Nonce::from_slice(nonce_bytes);
    let plaintext = cipher.decrypt(nonce, ciphertext).map_err(|e| SecretCipherError::Decrypt(e.to_string()))?;
    String::from_utf8(plaintext).map_err(|e| SecretCipherError::Decrypt(e.to_string()))
}
