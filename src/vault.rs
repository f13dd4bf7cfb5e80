//! # Credential Vault
//!
//! Declared contract for the external collaborator that protects connection
//! credentials at rest. The API layer only ever stores and moves the opaque
//! blobs this trait produces; the blobs never cross the API boundary.
//!
//! Real encryption is intentionally out of scope here. [`PlaceholderVault`]
//! marks blobs so they are recognizable as non-secret placeholder material.

use thiserror::Error;

/// Errors produced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("credential blob is not in the expected format")]
    MalformedBlob,
}

/// Contract for encrypting and decrypting connection credentials.
pub trait CredentialVault: Send + Sync {
    /// Turn plaintext credential material into an opaque storable blob.
    fn encrypt(&self, plaintext: &str) -> Result<String, VaultError>;

    /// Recover plaintext credentials from a stored blob.
    fn decrypt(&self, blob: &str) -> Result<String, VaultError>;
}

const PLACEHOLDER_PREFIX: &str = "PLACEHOLDER_ENCRYPTED_DATA:";

/// Stand-in vault that tags blobs without real cryptography.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderVault;

impl CredentialVault for PlaceholderVault {
    fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        Ok(format!("{PLACEHOLDER_PREFIX}{plaintext}"))
    }

    fn decrypt(&self, blob: &str) -> Result<String, VaultError> {
        blob.strip_prefix(PLACEHOLDER_PREFIX)
            .map(str::to_string)
            .ok_or(VaultError::MalformedBlob)
    }
}
