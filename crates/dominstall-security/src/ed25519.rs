use anyhow::{anyhow, Context, Result};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::checksum::sha256_hex;

/// Ed25519 public key that payload signatures are checked against.
#[derive(Debug, Clone)]
pub struct TrustedKey {
    key: VerifyingKey,
    fingerprint: String,
}

impl TrustedKey {
    pub fn from_hex(public_key_hex: &str) -> Result<Self> {
        let public_key_bytes = hex::decode(public_key_hex.trim())
            .context("failed to decode Ed25519 public key hex")?;
        let public_key_len = public_key_bytes.len();
        let public_key_array: [u8; 32] = public_key_bytes.try_into().map_err(|_| {
            anyhow!(
                "invalid Ed25519 public key length: expected 32 bytes, got {}",
                public_key_len
            )
        })?;
        let key = VerifyingKey::from_bytes(&public_key_array)
            .context("invalid Ed25519 public key bytes")?;
        let fingerprint = format!("ed25519:{}", &sha256_hex(key.as_bytes())[..16]);
        Ok(Self { key, fingerprint })
    }

    /// Short, stable label for reports: `ed25519:` plus the first 16 hex
    /// digits of the SHA-256 of the key bytes.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// `Ok(false)` means well-formed but not made by this key.
    pub fn verify_hex(&self, payload: &[u8], signature_hex: &str) -> Result<bool> {
        let signature_bytes = hex::decode(signature_hex.trim())
            .context("failed to decode Ed25519 signature hex")?;
        let signature_len = signature_bytes.len();
        let signature_array: [u8; 64] = signature_bytes.try_into().map_err(|_| {
            anyhow!(
                "invalid Ed25519 signature length: expected 64 bytes, got {}",
                signature_len
            )
        })?;
        let signature = Signature::from_bytes(&signature_array);
        Ok(self.key.verify(payload, &signature).is_ok())
    }
}
