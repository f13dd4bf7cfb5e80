//! # Connector Definitions API Handlers
//!
//! Read-only catalog endpoints. Definitions have no owner; any authenticated
//! principal can list them or look one up by key. OAuth2 details are only
//! projected for OAuth2-typed definitions.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::{ApiError, not_found};
use crate::models::connector_definition::{self, AuthType};
use crate::repositories::ConnectorDefinitionRepository;
use crate::server::AppState;

/// Connector definition information for API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectorDefinitionDto {
    /// Unique identifier for the definition
    pub id: i32,
    /// Stable connector key (e.g., "slack")
    pub key: String,
    /// User-facing display name
    pub name: String,
    /// Longer description, when present
    pub description: Option<String>,
    /// Logo reference for UI display
    pub logo_url: Option<String>,
    /// Authentication kind required by this connector
    pub auth_type: AuthType,
    /// Schema describing the credential fields the connector needs
    pub credential_fields_schema: Option<String>,
    /// OAuth2 client id (null unless auth_type is OAUTH2)
    pub oauth2_client_id: Option<String>,
    /// OAuth2 scopes (null unless auth_type is OAUTH2)
    pub oauth2_scopes: Option<String>,
    /// OAuth2 authorization endpoint (null unless auth_type is OAUTH2)
    pub oauth2_authorization_url: Option<String>,
    /// OAuth2 token endpoint (null unless auth_type is OAUTH2)
    pub oauth2_token_url: Option<String>,
}

impl From<connector_definition::Model> for ConnectorDefinitionDto {
    fn from(model: connector_definition::Model) -> Self {
        // OAuth2 fields are only meaningful for OAuth2 connectors; suppress
        // them for everything else even if columns are populated.
        let is_oauth2 = model.auth_type == AuthType::Oauth2;
        Self {
            id: model.id,
            key: model.key,
            name: model.name,
            description: model.description,
            logo_url: model.logo_url,
            auth_type: model.auth_type,
            credential_fields_schema: model.credential_fields_schema,
            oauth2_client_id: model.oauth2_client_id.filter(|_| is_oauth2),
            oauth2_scopes: model.oauth2_scopes.filter(|_| is_oauth2),
            oauth2_authorization_url: model.oauth2_authorization_url.filter(|_| is_oauth2),
            oauth2_token_url: model.oauth2_token_url.filter(|_| is_oauth2),
        }
    }
}

/// Lists the full connector catalog
#[utoipa::path(
    get,
    path = "/api/v1/connector-definitions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All connector definitions", body = [ConnectorDefinitionDto]),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "connector-definitions"
)]
pub async fn list_connector_definitions(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<ConnectorDefinitionDto>>, ApiError> {
    let repo = ConnectorDefinitionRepository::new(Arc::clone(&state.db));
    let definitions = repo.list_all().await?;

    Ok(Json(
        definitions
            .into_iter()
            .map(ConnectorDefinitionDto::from)
            .collect(),
    ))
}

/// Looks up a single connector definition by its key
#[utoipa::path(
    get,
    path = "/api/v1/connector-definitions/{key}",
    security(("bearer_auth" = [])),
    params(("key" = String, Path, description = "Stable connector key")),
    responses(
        (status = 200, description = "Connector definition", body = ConnectorDefinitionDto),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Unknown key", body = ApiError)
    ),
    tag = "connector-definitions"
)]
pub async fn get_connector_definition(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(key): Path<String>,
) -> Result<Json<ConnectorDefinitionDto>, ApiError> {
    let repo = ConnectorDefinitionRepository::new(Arc::clone(&state.db));
    let definition = repo
        .find_by_key(&key)
        .await?
        .ok_or_else(|| not_found(None))?;

    Ok(Json(definition.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{body_json, request, test_app, test_state};
    use crate::repositories::ConnectorDefinitionRepository;
    use axum::http::StatusCode;
    use chrono::Utc;
    use sea_orm::Set;
    use tower::ServiceExt;

    async fn seed_definition(
        repo: &ConnectorDefinitionRepository,
        key: &str,
        auth_type: AuthType,
    ) -> connector_definition::Model {
        let now = Utc::now();
        let oauth2 = auth_type == AuthType::Oauth2;
        repo.create(connector_definition::ActiveModel {
            key: Set(key.to_string()),
            name: Set(key.to_uppercase()),
            description: Set(Some(format!("{key} connector"))),
            logo_url: Set(Some(format!("https://logos.example.com/{key}.png"))),
            auth_type: Set(auth_type),
            credential_fields_schema: Set(Some("{\"api_key\":\"string\"}".to_string())),
            oauth2_client_id: Set(oauth2.then(|| "client-123".to_string())),
            oauth2_scopes: Set(oauth2.then(|| "read,write".to_string())),
            oauth2_authorization_url: Set(oauth2.then(|| "https://auth.example.com".to_string())),
            oauth2_token_url: Set(oauth2.then(|| "https://token.example.com".to_string())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn list_requires_authentication() {
        let state = test_state().await;
        let response = test_app(state)
            .oneshot(request("GET", "/api/v1/connector-definitions", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_returns_catalog_ordered_by_key() {
        let state = test_state().await;
        let repo = ConnectorDefinitionRepository::new(Arc::clone(&state.db));
        seed_definition(&repo, "slack", AuthType::Oauth2).await;
        seed_definition(&repo, "sendgrid", AuthType::ApiKey).await;

        let response = test_app(state)
            .oneshot(request("GET", "/api/v1/connector-definitions", Some("uid-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let keys: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["sendgrid", "slack"]);
    }

    #[tokio::test]
    async fn oauth2_fields_are_gated_by_auth_type() {
        let state = test_state().await;
        let repo = ConnectorDefinitionRepository::new(Arc::clone(&state.db));
        seed_definition(&repo, "slack", AuthType::Oauth2).await;
        seed_definition(&repo, "sendgrid", AuthType::ApiKey).await;

        let app = test_app(state);

        let slack = body_json(
            app.clone()
                .oneshot(request(
                    "GET",
                    "/api/v1/connector-definitions/slack",
                    Some("uid-1"),
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(slack["auth_type"], "OAUTH2");
        assert_eq!(slack["oauth2_client_id"], "client-123");
        assert_eq!(slack["oauth2_token_url"], "https://token.example.com");

        let sendgrid = body_json(
            app.oneshot(request(
                "GET",
                "/api/v1/connector-definitions/sendgrid",
                Some("uid-1"),
            ))
            .await
            .unwrap(),
        )
        .await;
        assert_eq!(sendgrid["auth_type"], "API_KEY");
        assert!(sendgrid["oauth2_client_id"].is_null());
        assert!(sendgrid["oauth2_scopes"].is_null());
        assert!(sendgrid["oauth2_authorization_url"].is_null());
        assert!(sendgrid["oauth2_token_url"].is_null());
    }

    #[tokio::test]
    async fn unknown_key_returns_404() {
        let state = test_state().await;
        let response = test_app(state)
            .oneshot(request(
                "GET",
                "/api/v1/connector-definitions/nope",
                Some("uid-1"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
