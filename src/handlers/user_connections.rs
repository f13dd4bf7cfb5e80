//! # User Connections API Handlers
//!
//! Owner-scoped connection endpoints. Responses flatten the connector's
//! key, display name and logo for convenience and never carry the stored
//! credential blob. Credentials arrive in plaintext on create, are handed to
//! the vault, and only the opaque blob is persisted.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::{ApiError, Json, validation_error};
use crate::handlers::FieldErrors;
use crate::models::{connector_definition, user_connection};
use crate::repositories::{ConnectorDefinitionRepository, UserConnectionRepository};
use crate::server::AppState;

/// User connection information for API responses.
///
/// Deliberately omits the encrypted credential blob; there is no field for
/// it, so no code path can leak it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserConnectionDto {
    /// Unique identifier for the connection
    pub id: i32,
    /// Key of the connected service
    pub connector_key: String,
    /// Display name of the connected service
    pub connector_name: String,
    /// Logo reference of the connected service
    pub connector_logo_url: Option<String>,
    /// User-chosen name for this connection
    pub connection_name: String,
    /// Optional credential expiry timestamp (RFC 3339)
    pub expires_at: Option<String>,
    /// Whether the connection is active
    pub active: bool,
    /// Timestamp when the connection was created (RFC 3339)
    pub created_at: String,
}

impl From<(user_connection::Model, connector_definition::Model)> for UserConnectionDto {
    fn from((connection, definition): (user_connection::Model, connector_definition::Model)) -> Self {
        Self {
            id: connection.id,
            connector_key: definition.key,
            connector_name: definition.name,
            connector_logo_url: definition.logo_url,
            connection_name: connection.connection_name,
            expires_at: connection.expires_at.map(|dt| dt.to_rfc3339()),
            active: connection.active,
            created_at: connection.created_at.to_rfc3339(),
        }
    }
}

/// Request body for creating a connection
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserConnectionRequest {
    /// Key of the connector definition to connect to
    pub connector_key: String,
    /// User-chosen name for the connection
    pub connection_name: String,
    /// Plaintext credential fields; encrypted before storage
    pub credentials: serde_json::Value,
    /// Optional credential expiry timestamp
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateUserConnectionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        errors.require_non_blank("connector_key", &self.connector_key);
        errors.require_non_blank("connection_name", &self.connection_name);
        errors.require_max_len("connection_name", &self.connection_name, 255);
        if !self.credentials.is_object() {
            errors.push("credentials", "must be a JSON object of credential fields");
        }
        errors.into_result()
    }
}

/// Lists the authenticated principal's connections
#[utoipa::path(
    get,
    path = "/api/v1/user-connections",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's connections", body = [UserConnectionDto]),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "user-connections"
)]
pub async fn list_user_connections(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserConnectionDto>>, ApiError> {
    let repo = UserConnectionRepository::new(Arc::clone(&state.db));
    let connections = repo.list_by_owner(user.id).await?;

    Ok(Json(
        connections.into_iter().map(UserConnectionDto::from).collect(),
    ))
}

/// Creates a connection owned by the authenticated principal
#[utoipa::path(
    post,
    path = "/api/v1/user-connections",
    security(("bearer_auth" = [])),
    request_body = CreateUserConnectionRequest,
    responses(
        (status = 201, description = "Connection created", body = UserConnectionDto),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "user-connections"
)]
pub async fn create_user_connection(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateUserConnectionRequest>,
) -> Result<(StatusCode, Json<UserConnectionDto>), ApiError> {
    request.validate()?;

    let definitions = ConnectorDefinitionRepository::new(Arc::clone(&state.db));
    let definition = definitions
        .find_by_key(&request.connector_key)
        .await?
        .ok_or_else(|| {
            validation_error(
                "Request validation failed",
                serde_json::json!({ "connector_key": "unknown connector" }),
            )
        })?;

    let blob = state.vault.encrypt(&request.credentials.to_string())?;

    let now = Utc::now();
    let repo = UserConnectionRepository::new(Arc::clone(&state.db));
    let created = repo
        .create(user_connection::ActiveModel {
            // Owner always comes from the security context, never the body.
            user_id: Set(user.id),
            connector_definition_id: Set(definition.id),
            connection_name: Set(request.connection_name),
            encrypted_credentials: Set(blob),
            expires_at: Set(request.expires_at.map(|dt| dt.into())),
            active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        })
        .await?;

    tracing::info!(
        user_id = user.id,
        connection_id = created.id,
        connector = %definition.key,
        "Created user connection"
    );

    Ok((StatusCode::CREATED, Json((created, definition).into())))
}

/// Deletes a connection owned by the authenticated principal
#[utoipa::path(
    delete,
    path = "/api/v1/user-connections/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Connection identifier")),
    responses(
        (status = 204, description = "Connection deleted"),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Owned by another user", body = ApiError),
        (status = 404, description = "Unknown connection", body = ApiError)
    ),
    tag = "user-connections"
)]
pub async fn delete_user_connection(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let repo = UserConnectionRepository::new(Arc::clone(&state.db));
    repo.delete_owned(id, user.id).await?;

    tracing::info!(user_id = user.id, connection_id = id, "Deleted user connection");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{body_json, json_request, request, test_app, test_state};
    use crate::models::connector_definition::AuthType;
    use axum::http::StatusCode;
    use sea_orm::Set;
    use tower::ServiceExt;

    async fn seed_definition(state: &AppState, key: &str) {
        let now = Utc::now();
        ConnectorDefinitionRepository::new(Arc::clone(&state.db))
            .create(connector_definition::ActiveModel {
                key: Set(key.to_string()),
                name: Set("Slack".to_string()),
                description: Set(None),
                logo_url: Set(Some("https://logos.example.com/slack.png".to_string())),
                auth_type: Set(AuthType::ApiKey),
                credential_fields_schema: Set(None),
                oauth2_client_id: Set(None),
                oauth2_scopes: Set(None),
                oauth2_authorization_url: Set(None),
                oauth2_token_url: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    fn create_body() -> serde_json::Value {
        serde_json::json!({
            "connector_key": "slack",
            "connection_name": "Team workspace",
            "credentials": { "api_key": "xoxb-secret" }
        })
    }

    #[tokio::test]
    async fn create_and_list_never_expose_credentials() {
        let state = test_state().await;
        seed_definition(&state, "slack").await;
        let app = test_app(state);

        let created = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/user-connections",
                Some("uid-1"),
                create_body(),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let created_body = body_json(created).await;
        assert_eq!(created_body["connector_key"], "slack");
        assert_eq!(created_body["connector_name"], "Slack");
        assert_eq!(created_body["connection_name"], "Team workspace");
        assert!(!created_body.to_string().contains("xoxb-secret"));
        assert!(!created_body.to_string().contains("encrypted"));

        let listed = app
            .oneshot(request("GET", "/api/v1/user-connections", Some("uid-1")))
            .await
            .unwrap();
        let listed_body = body_json(listed).await;
        assert_eq!(listed_body.as_array().unwrap().len(), 1);
        assert!(!listed_body.to_string().contains("xoxb-secret"));
    }

    #[tokio::test]
    async fn list_is_scoped_to_the_caller() {
        let state = test_state().await;
        seed_definition(&state, "slack").await;
        let app = test_app(state);

        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/user-connections",
                Some("uid-1"),
                create_body(),
            ))
            .await
            .unwrap();

        let other = app
            .oneshot(request("GET", "/api/v1/user-connections", Some("uid-2")))
            .await
            .unwrap();
        let body = body_json(other).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_unknown_connector_key() {
        let state = test_state().await;
        let app = test_app(state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/user-connections",
                Some("uid-1"),
                create_body(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["details"]["connector_key"], "unknown connector");
    }

    #[tokio::test]
    async fn create_rejects_blank_fields_before_store_access() {
        let state = test_state().await;
        let app = test_app(state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/user-connections",
                Some("uid-1"),
                serde_json::json!({
                    "connector_key": "",
                    "connection_name": "   ",
                    "credentials": "not-an-object"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["details"]["connector_key"].is_string());
        assert!(body["details"]["connection_name"].is_string());
        assert!(body["details"]["credentials"].is_string());
    }

    #[tokio::test]
    async fn delete_of_foreign_connection_is_forbidden() {
        let state = test_state().await;
        seed_definition(&state, "slack").await;
        let app = test_app(state);

        let created = body_json(
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/api/v1/user-connections",
                    Some("uid-1"),
                    create_body(),
                ))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        let forbidden = app
            .clone()
            .oneshot(request(
                "DELETE",
                &format!("/api/v1/user-connections/{id}"),
                Some("uid-2"),
            ))
            .await
            .unwrap();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let deleted = app
            .oneshot(request(
                "DELETE",
                &format!("/api/v1/user-connections/{id}"),
                Some("uid-1"),
            ))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn delete_of_missing_connection_is_not_found() {
        let state = test_state().await;
        let app = test_app(state);

        let response = app
            .oneshot(request("DELETE", "/api/v1/user-connections/999", Some("uid-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
