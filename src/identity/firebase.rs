//! Firebase implementation of the identity provider contract.
//!
//! ID tokens are RS256 JWTs issued by Firebase's securetoken service. This
//! module verifies them against Google's published JWKS (cached in-process,
//! refreshed when an unknown key id appears) and resolves profile attributes
//! through the Identity Toolkit `accounts:lookup` endpoint.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{IdentityError, IdentityProvider, SubjectProfile};
use crate::config::AppConfig;

/// Minimum interval between JWKS refetches triggered by unknown key ids.
const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Claims we care about from a Firebase ID token.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
}

/// One RSA key from the provider's JWKS document.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

struct KeyCache {
    keys: HashMap<String, Jwk>,
    fetched_at: Option<Instant>,
}

/// Identity provider backed by Firebase Authentication.
pub struct FirebaseIdentityProvider {
    http: reqwest::Client,
    project_id: String,
    api_key: Option<String>,
    jwks_url: String,
    lookup_url: String,
    cache: RwLock<KeyCache>,
}

impl FirebaseIdentityProvider {
    /// Builds a provider from application configuration.
    ///
    /// Fails when no Firebase project id is configured, since tokens cannot
    /// be audience-checked without one.
    pub fn from_config(config: &AppConfig) -> Result<Self, IdentityError> {
        let project_id = config
            .firebase_project_id
            .clone()
            .ok_or(IdentityError::MissingConfiguration)?;

        Ok(Self {
            http: reqwest::Client::new(),
            project_id,
            api_key: config.firebase_api_key.clone(),
            jwks_url: config.identity_jwks_url.clone(),
            lookup_url: config.identity_lookup_url.clone(),
            cache: RwLock::new(KeyCache {
                keys: HashMap::new(),
                fetched_at: None,
            }),
        })
    }

    async fn decoding_key_for(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        if let Some(jwk) = self.cache.read().await.keys.get(kid) {
            return Self::decoding_key(jwk);
        }

        let mut cache = self.cache.write().await;
        let stale = cache
            .fetched_at
            .is_none_or(|at| at.elapsed() >= JWKS_REFRESH_INTERVAL);

        if stale {
            let document: JwksDocument = self
                .http
                .get(&self.jwks_url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            cache.keys = document
                .keys
                .into_iter()
                .map(|key| (key.kid.clone(), key))
                .collect();
            cache.fetched_at = Some(Instant::now());
            tracing::debug!(keys = cache.keys.len(), "Refreshed identity provider JWKS");
        }

        match cache.keys.get(kid) {
            Some(jwk) => Self::decoding_key(jwk),
            None => Err(IdentityError::UnknownKey {
                kid: kid.to_string(),
            }),
        }
    }

    fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, IdentityError> {
        DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| IdentityError::InvalidToken(format!("bad provider key material: {e}")))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!(
            "https://securetoken.google.com/{}",
            self.project_id
        )]);
        validation
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn verify(&self, token: &str) -> Result<String, IdentityError> {
        let header = decode_header(token)
            .map_err(|e| IdentityError::InvalidToken(format!("malformed token: {e}")))?;
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("token has no key id".to_string()))?;

        let key = self.decoding_key_for(&kid).await?;
        let data = decode::<IdTokenClaims>(token, &key, &self.validation())
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(IdentityError::InvalidToken(
                "token has empty subject".to_string(),
            ));
        }

        Ok(data.claims.sub)
    }

    async fn profile(&self, subject: &str) -> Result<SubjectProfile, IdentityError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(IdentityError::MissingConfiguration)?;

        let response: LookupResponse = self
            .http
            .post(format!("{}?key={}", self.lookup_url, api_key))
            .json(&serde_json::json!({ "localId": [subject] }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let user = response
            .users
            .into_iter()
            .find(|user| user.local_id == subject)
            .ok_or(IdentityError::ProfileNotFound)?;

        Ok(SubjectProfile {
            email: user.email.ok_or(IdentityError::ProfileNotFound)?,
            display_name: user.display_name,
        })
    }
}
