//! # Identity Resolution
//!
//! This module defines the seam between the API and the external identity
//! provider: verifying externally-issued bearer tokens and fetching profile
//! attributes for lazy principal provisioning. The trait exists so tests can
//! substitute a fake without a live provider dependency.

use async_trait::async_trait;
use thiserror::Error;

pub mod firebase;

pub use firebase::FirebaseIdentityProvider;

/// Profile attributes fetched from the identity provider for a verified subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectProfile {
    /// Email address registered with the provider
    pub email: String,
    /// Display name, when the provider has one
    pub display_name: Option<String>,
}

/// Errors produced while resolving an identity.
///
/// Every variant is treated as an authentication failure by the gate: the
/// request proceeds unauthenticated and protected routes deny access.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider is not configured")]
    MissingConfiguration,
    #[error("token rejected: {0}")]
    InvalidToken(String),
    #[error("signing key '{kid}' not present in provider key set")]
    UnknownKey { kid: String },
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no profile found for verified subject")]
    ProfileNotFound,
}

/// External identity provider contract.
///
/// `verify` exchanges a bearer token for a verified external subject
/// identifier; `profile` fetches the attributes used to provision the local
/// principal on first sight.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify the token's signature and claims, returning the subject id.
    async fn verify(&self, token: &str) -> Result<String, IdentityError>;

    /// Fetch profile attributes for a previously verified subject.
    async fn profile(&self, subject: &str) -> Result<SubjectProfile, IdentityError>;
}
