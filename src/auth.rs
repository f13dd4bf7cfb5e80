//! # Authentication and Authorization
//!
//! This module verifies Firebase bearer tokens and resolves them to local
//! principals. Verification failures never abort the request here: the
//! request simply proceeds unauthenticated and protected handlers reject it
//! through the [`CurrentUser`] extractor. Principals are provisioned lazily
//! the first time a verified subject is seen.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::{ApiError, unauthorized};
use crate::identity::IdentityError;
use crate::models::user;
use crate::repositories::UserRepository;
use crate::server::AppState;

/// The local principal resolved for an authenticated request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

/// Authentication middleware that resolves bearer tokens to local principals.
///
/// A missing or non-Bearer Authorization header, and any identity-provider
/// failure, leaves the request anonymous. Database failures while resolving
/// or provisioning the principal are surfaced as errors.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_bearer_token(request.headers()) {
        match resolve_principal(&state, token).await? {
            Some(principal) => {
                tracing::debug!(user_id = principal.id, "Authenticated request");
                request.extensions_mut().insert(CurrentUser(principal));
            }
            None => {
                tracing::debug!("Bearer token rejected, continuing unauthenticated");
            }
        }
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Verifies the token and maps the subject to a local principal, creating one
/// on first sight. Identity failures resolve to `None`; database failures
/// propagate.
async fn resolve_principal(
    state: &AppState,
    token: &str,
) -> Result<Option<user::Model>, ApiError> {
    let subject = match state.identity.verify(token).await {
        Ok(subject) => subject,
        Err(err) => {
            tracing::warn!(error = %err, "Token verification failed");
            return Ok(None);
        }
    };

    let users = UserRepository::new(state.db.clone());
    if let Some(existing) = users.find_by_firebase_uid(&subject).await? {
        return Ok(Some(existing));
    }

    let profile = match state.identity.profile(&subject).await {
        Ok(profile) => profile,
        Err(err @ IdentityError::ProfileNotFound) => {
            tracing::warn!(error = %err, "Verified subject has no provider profile");
            return Ok(None);
        }
        Err(err) => {
            tracing::warn!(error = %err, "Profile lookup failed");
            return Ok(None);
        }
    };

    let created = users
        .create(&subject, &profile.email, profile.display_name)
        .await?;
    tracing::info!(user_id = created.id, "Provisioned principal on first sight");

    Ok(Some(created))
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| unauthorized(Some("Authentication required")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::identity::{IdentityProvider, SubjectProfile};
    use crate::vault::PlaceholderVault;
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use migration::MigratorTrait;
    use sea_orm::{Database, EntityTrait, PaginatorTrait};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FakeIdentity {
        tokens: HashMap<String, String>,
        profiles: HashMap<String, SubjectProfile>,
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn verify(&self, token: &str) -> Result<String, IdentityError> {
            self.tokens
                .get(token)
                .cloned()
                .ok_or_else(|| IdentityError::InvalidToken("unknown token".to_string()))
        }

        async fn profile(&self, subject: &str) -> Result<SubjectProfile, IdentityError> {
            self.profiles
                .get(subject)
                .cloned()
                .ok_or(IdentityError::ProfileNotFound)
        }
    }

    async fn test_state() -> AppState {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        let identity = FakeIdentity {
            tokens: HashMap::from([("good-token".to_string(), "uid-1".to_string())]),
            profiles: HashMap::from([(
                "uid-1".to_string(),
                SubjectProfile {
                    email: "ada@example.com".to_string(),
                    display_name: Some("Ada".to_string()),
                },
            )]),
        };

        AppState {
            config: Arc::new(AppConfig::default()),
            db: Arc::new(db),
            identity: Arc::new(identity),
            vault: Arc::new(PlaceholderVault),
        }
    }

    fn app(state: AppState) -> Router {
        async fn handler(CurrentUser(user): CurrentUser) -> String {
            user.email
        }

        Router::new()
            .route("/whoami", get(handler))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
            .with_state(state)
    }

    fn whoami(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_token_returns_401() {
        let state = test_state().await;
        let response = app(state).oneshot(whoami(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let state = test_state().await;
        let response = app(state).oneshot(whoami(Some("bogus"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_anonymous() {
        let state = test_state().await;
        let request = Request::builder()
            .uri("/whoami")
            .header("Authorization", "Basic dGVzdDoxMjM=")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_provisions_principal_on_first_sight() {
        let state = test_state().await;
        let db = Arc::clone(&state.db);

        let response = app(state)
            .oneshot(whoami(Some("good-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let provisioned = user::Entity::find().count(&*db).await.unwrap();
        assert_eq!(provisioned, 1);
    }

    #[tokio::test]
    async fn repeat_requests_reuse_existing_principal() {
        let state = test_state().await;
        let db = Arc::clone(&state.db);

        for _ in 0..3 {
            let response = app(state.clone())
                .oneshot(whoami(Some("good-token")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let provisioned = user::Entity::find().count(&*db).await.unwrap();
        assert_eq!(provisioned, 1);
    }
}
