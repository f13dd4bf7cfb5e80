//! # Workflows API Handlers
//!
//! Owner-scoped workflow lifecycle. Trigger and action configurations are
//! opaque strings to this layer. Updates are partial patches: omitted fields
//! are unchanged, and an explicit `"description": null` clears the field.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::{ApiError, Json};
use crate::handlers::FieldErrors;
use crate::models::workflow;
use crate::repositories::{WorkflowPatch, WorkflowRepository};
use crate::server::AppState;

/// Workflow information for API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkflowDto {
    /// Unique identifier for the workflow
    pub id: i32,
    /// Identifier of the owning user
    pub user_id: i32,
    /// Workflow name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Whether the workflow is enabled
    pub enabled: bool,
    /// Opaque trigger configuration
    pub trigger_config: String,
    /// Opaque action configuration
    pub action_config: String,
    /// Timestamp when the workflow was created (RFC 3339)
    pub created_at: String,
    /// Timestamp when the workflow was last updated (RFC 3339)
    pub updated_at: String,
}

impl From<workflow::Model> for WorkflowDto {
    fn from(model: workflow::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            enabled: model.enabled,
            trigger_config: model.trigger_config,
            action_config: model.action_config,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Request body for creating a workflow
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateWorkflowRequest {
    /// Workflow name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Whether the workflow starts enabled (defaults to false)
    #[serde(default)]
    pub enabled: bool,
    /// Opaque trigger configuration
    pub trigger_config: String,
    /// Opaque action configuration
    pub action_config: String,
}

impl CreateWorkflowRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        errors.require_non_blank("name", &self.name);
        errors.require_max_len("name", &self.name, 255);
        if let Some(description) = &self.description {
            errors.require_max_len("description", description, 1024);
        }
        errors.require_non_blank("trigger_config", &self.trigger_config);
        errors.require_non_blank("action_config", &self.action_config);
        errors.into_result()
    }
}

/// Distinguishes a field that is present (including present-as-null) from one
/// that was omitted entirely.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Request body for updating a workflow (partial patch)
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateWorkflowRequest {
    /// New workflow name, when present
    pub name: Option<String>,
    /// New description; `null` clears it, omission leaves it unchanged
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// New enabled flag, when present
    pub enabled: Option<bool>,
    /// New trigger configuration, when present
    pub trigger_config: Option<String>,
    /// New action configuration, when present
    pub action_config: Option<String>,
}

impl UpdateWorkflowRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        if let Some(name) = &self.name {
            errors.require_non_blank("name", name);
            errors.require_max_len("name", name, 255);
        }
        if let Some(Some(description)) = &self.description {
            errors.require_max_len("description", description, 1024);
        }
        if let Some(trigger_config) = &self.trigger_config {
            errors.require_non_blank("trigger_config", trigger_config);
        }
        if let Some(action_config) = &self.action_config {
            errors.require_non_blank("action_config", action_config);
        }
        errors.into_result()
    }

    fn into_patch(self) -> WorkflowPatch {
        WorkflowPatch {
            name: self.name,
            description: self.description,
            enabled: self.enabled,
            trigger_config: self.trigger_config,
            action_config: self.action_config,
        }
    }
}

/// Lists the authenticated principal's workflows
#[utoipa::path(
    get,
    path = "/api/v1/workflows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's workflows", body = [WorkflowDto]),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "workflows"
)]
pub async fn list_workflows(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<WorkflowDto>>, ApiError> {
    let repo = WorkflowRepository::new(Arc::clone(&state.db));
    let workflows = repo.list_by_owner(user.id).await?;

    Ok(Json(workflows.into_iter().map(WorkflowDto::from).collect()))
}

/// Creates a workflow owned by the authenticated principal
#[utoipa::path(
    post,
    path = "/api/v1/workflows",
    security(("bearer_auth" = [])),
    request_body = CreateWorkflowRequest,
    responses(
        (status = 201, description = "Workflow created", body = WorkflowDto),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "workflows"
)]
pub async fn create_workflow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<WorkflowDto>), ApiError> {
    request.validate()?;

    let now = Utc::now();
    let repo = WorkflowRepository::new(Arc::clone(&state.db));
    let created = repo
        .create(workflow::ActiveModel {
            // Owner always comes from the security context, never the body.
            user_id: Set(user.id),
            name: Set(request.name),
            description: Set(request.description),
            enabled: Set(request.enabled),
            trigger_config: Set(request.trigger_config),
            action_config: Set(request.action_config),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        })
        .await?;

    tracing::info!(user_id = user.id, workflow_id = created.id, "Created workflow");

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Fetches one workflow owned by the authenticated principal
#[utoipa::path(
    get,
    path = "/api/v1/workflows/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Workflow identifier")),
    responses(
        (status = 200, description = "Workflow", body = WorkflowDto),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Owned by another user", body = ApiError),
        (status = 404, description = "Unknown workflow", body = ApiError)
    ),
    tag = "workflows"
)]
pub async fn get_workflow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<WorkflowDto>, ApiError> {
    let repo = WorkflowRepository::new(Arc::clone(&state.db));
    let workflow = repo.get_owned(id, user.id).await?;

    Ok(Json(workflow.into()))
}

/// Partially updates a workflow owned by the authenticated principal
#[utoipa::path(
    put,
    path = "/api/v1/workflows/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Workflow identifier")),
    request_body = UpdateWorkflowRequest,
    responses(
        (status = 200, description = "Updated workflow", body = WorkflowDto),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Owned by another user", body = ApiError),
        (status = 404, description = "Unknown workflow", body = ApiError)
    ),
    tag = "workflows"
)]
pub async fn update_workflow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateWorkflowRequest>,
) -> Result<Json<WorkflowDto>, ApiError> {
    request.validate()?;

    let repo = WorkflowRepository::new(Arc::clone(&state.db));
    let updated = repo.update_owned(id, user.id, request.into_patch()).await?;

    tracing::info!(user_id = user.id, workflow_id = id, "Updated workflow");

    Ok(Json(updated.into()))
}

/// Deletes a workflow owned by the authenticated principal
#[utoipa::path(
    delete,
    path = "/api/v1/workflows/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Workflow identifier")),
    responses(
        (status = 204, description = "Workflow deleted"),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Owned by another user", body = ApiError),
        (status = 404, description = "Unknown workflow", body = ApiError)
    ),
    tag = "workflows"
)]
pub async fn delete_workflow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let repo = WorkflowRepository::new(Arc::clone(&state.db));
    repo.delete_owned(id, user.id).await?;

    tracing::info!(user_id = user.id, workflow_id = id, "Deleted workflow");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{body_json, json_request, request, test_app, test_state};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn create_body() -> serde_json::Value {
        serde_json::json!({
            "name": "Daily report",
            "description": "Morning digest",
            "trigger_config": "{\"cron\":\"0 9 * * *\"}",
            "action_config": "{\"post\":\"#general\"}"
        })
    }

    #[tokio::test]
    async fn create_defaults_to_disabled_and_binds_owner() {
        let state = test_state().await;
        let app = test_app(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/workflows",
                Some("uid-1"),
                create_body(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["name"], "Daily report");
        assert_eq!(body["enabled"], false);
        assert!(body["id"].as_i64().is_some());

        // Get by the owner returns the same fields back unchanged.
        let id = body["id"].as_i64().unwrap();
        let fetched = body_json(
            app.oneshot(request(
                "GET",
                &format!("/api/v1/workflows/{id}"),
                Some("uid-1"),
            ))
            .await
            .unwrap(),
        )
        .await;
        assert_eq!(fetched["name"], body["name"]);
        assert_eq!(fetched["trigger_config"], body["trigger_config"]);
        assert_eq!(fetched["user_id"], body["user_id"]);
    }

    #[tokio::test]
    async fn get_by_different_principal_is_forbidden() {
        let state = test_state().await;
        let app = test_app(state);

        let created = body_json(
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/api/v1/workflows",
                    Some("uid-1"),
                    create_body(),
                ))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        let response = app
            .oneshot(request(
                "GET",
                &format!("/api/v1/workflows/{id}"),
                Some("uid-2"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(body["message"], "You do not have access to this resource");
    }

    #[tokio::test]
    async fn update_with_omitted_description_leaves_it_unchanged() {
        let state = test_state().await;
        let app = test_app(state);

        let created = body_json(
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/api/v1/workflows",
                    Some("uid-1"),
                    create_body(),
                ))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        let updated = body_json(
            app.oneshot(json_request(
                "PUT",
                &format!("/api/v1/workflows/{id}"),
                Some("uid-1"),
                serde_json::json!({ "enabled": true }),
            ))
            .await
            .unwrap(),
        )
        .await;
        assert_eq!(updated["enabled"], true);
        assert_eq!(updated["description"], "Morning digest");
    }

    #[tokio::test]
    async fn update_with_explicit_null_clears_description() {
        let state = test_state().await;
        let app = test_app(state);

        let created = body_json(
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/api/v1/workflows",
                    Some("uid-1"),
                    create_body(),
                ))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        let updated = body_json(
            app.oneshot(json_request(
                "PUT",
                &format!("/api/v1/workflows/{id}"),
                Some("uid-1"),
                serde_json::json!({ "description": null }),
            ))
            .await
            .unwrap(),
        )
        .await;
        assert!(updated["description"].is_null());
        assert_eq!(updated["name"], "Daily report");
    }

    #[tokio::test]
    async fn create_rejects_blank_required_fields() {
        let state = test_state().await;
        let app = test_app(state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/workflows",
                Some("uid-1"),
                serde_json::json!({
                    "name": "  ",
                    "trigger_config": "",
                    "action_config": "{}"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert!(body["details"]["name"].is_string());
        assert!(body["details"]["trigger_config"].is_string());
        assert!(body["details"]["action_config"].is_null());
    }

    #[tokio::test]
    async fn create_with_missing_required_field_uses_error_envelope() {
        let state = test_state().await;
        let app = test_app(state);

        // Body deserialization failures must render the same problem+json
        // shape as handler-level validation, not a plain-text rejection.
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/workflows",
                Some("uid-1"),
                serde_json::json!({ "name": "Daily report" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/problem+json"
        );

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert!(body["trace_id"].is_string());
    }

    #[tokio::test]
    async fn update_with_malformed_json_uses_error_envelope() {
        use axum::body::Body;
        use axum::http::Request;

        let state = test_state().await;
        let app = test_app(state);

        let request = Request::builder()
            .method("PUT")
            .uri("/api/v1/workflows/1")
            .header("Authorization", "Bearer token-for-uid-1")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn update_of_missing_workflow_is_not_found() {
        let state = test_state().await;
        let app = test_app(state);

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/v1/workflows/999",
                Some("uid-1"),
                serde_json::json!({ "enabled": true }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_by_non_owner_is_forbidden_and_leaves_row() {
        let state = test_state().await;
        let app = test_app(state);

        let created = body_json(
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/api/v1/workflows",
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
                &format!("/api/v1/workflows/{id}"),
                Some("uid-2"),
            ))
            .await
            .unwrap();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let still_there = app
            .clone()
            .oneshot(request(
                "GET",
                &format!("/api/v1/workflows/{id}"),
                Some("uid-1"),
            ))
            .await
            .unwrap();
        assert_eq!(still_there.status(), StatusCode::OK);

        let deleted = app
            .oneshot(request(
                "DELETE",
                &format!("/api/v1/workflows/{id}"),
                Some("uid-1"),
            ))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn list_is_scoped_to_the_caller() {
        let state = test_state().await;
        let app = test_app(state);

        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/workflows",
                Some("uid-1"),
                create_body(),
            ))
            .await
            .unwrap();

        let own = body_json(
            app.clone()
                .oneshot(request("GET", "/api/v1/workflows", Some("uid-1")))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(own.as_array().unwrap().len(), 1);

        let other = body_json(
            app.oneshot(request("GET", "/api/v1/workflows", Some("uid-2")))
                .await
                .unwrap(),
        )
        .await;
        assert!(other.as_array().unwrap().is_empty());
    }
}
