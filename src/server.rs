//! # Server Configuration
//!
//! This module contains the server setup and configuration for the
//! Automation Builder API. The `/api/v1` subtree sits behind the
//! authentication gate; everything outside the allow-listed public routes
//! falls through to a deny-all 404.

use anyhow::Context;
use axum::{
    Router,
    routing::{delete, get},
};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::error::not_found;
use crate::handlers;
use crate::identity::{FirebaseIdentityProvider, IdentityProvider};
use crate::telemetry::trace_middleware;
use crate::vault::{CredentialVault, PlaceholderVault};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<DatabaseConnection>,
    pub identity: Arc<dyn IdentityProvider>,
    pub vault: Arc<dyn CredentialVault>,
}

/// Routes for the protected `/api/v1` subtree.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/connector-definitions",
            get(handlers::connector_definitions::list_connector_definitions),
        )
        .route(
            "/connector-definitions/{key}",
            get(handlers::connector_definitions::get_connector_definition),
        )
        .route(
            "/user-connections",
            get(handlers::user_connections::list_user_connections)
                .post(handlers::user_connections::create_user_connection),
        )
        .route(
            "/user-connections/{id}",
            delete(handlers::user_connections::delete_user_connection),
        )
        .route(
            "/workflows",
            get(handlers::workflows::list_workflows).post(handlers::workflows::create_workflow),
        )
        .route(
            "/workflows/{id}",
            get(handlers::workflows::get_workflow)
                .put(handlers::workflows::update_workflow)
                .delete(handlers::workflows::delete_workflow),
        )
        .with_state(state)
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .with_state(state.clone())
        .nest(
            "/api/v1",
            api_router(state.clone())
                .layer(axum::middleware::from_fn_with_state(state, auth_middleware)),
        )
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        // Anything not explicitly routed is denied without leaking structure.
        .fallback(|| async { not_found(None) })
        .layer(axum::middleware::from_fn(trace_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let db = crate::db::init_pool(&config)
        .await
        .context("Failed to initialize database pool")?;

    migration::Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;

    if config.seed_connectors {
        crate::seeds::seed_connector_definitions(&db)
            .await
            .context("Failed to seed connector definitions")?;
    }

    let identity =
        FirebaseIdentityProvider::from_config(&config).context("Failed to configure identity provider")?;

    let addr = config.bind_addr().context("Invalid server address")?;
    let profile = config.profile.clone();

    let state = AppState {
        config: Arc::new(config),
        db: Arc::new(db),
        identity: Arc::new(identity),
        vault: Arc::new(PlaceholderVault),
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Adds the bearer scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::readyz,
        crate::handlers::connector_definitions::list_connector_definitions,
        crate::handlers::connector_definitions::get_connector_definition,
        crate::handlers::user_connections::list_user_connections,
        crate::handlers::user_connections::create_user_connection,
        crate::handlers::user_connections::delete_user_connection,
        crate::handlers::workflows::list_workflows,
        crate::handlers::workflows::create_workflow,
        crate::handlers::workflows::get_workflow,
        crate::handlers::workflows::update_workflow,
        crate::handlers::workflows::delete_workflow,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::HealthStatus,
            crate::models::connector_definition::AuthType,
            crate::handlers::connector_definitions::ConnectorDefinitionDto,
            crate::handlers::user_connections::UserConnectionDto,
            crate::handlers::user_connections::CreateUserConnectionRequest,
            crate::handlers::workflows::WorkflowDto,
            crate::handlers::workflows::CreateWorkflowRequest,
            crate::handlers::workflows::UpdateWorkflowRequest,
            crate::error::ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Automation Builder API",
        description = "API for managing connectors, connections and workflows",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
