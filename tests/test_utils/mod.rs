//! Test utilities for integration tests.
//!
//! Provides an in-memory SQLite database with migrations applied, a static
//! identity provider, and a helper that spawns the full application on a
//! random port with graceful shutdown.

use anyhow::{Context, Result};
use async_trait::async_trait;
use automation_builder::config::AppConfig;
use automation_builder::identity::{IdentityError, IdentityProvider, SubjectProfile};
use automation_builder::server::{AppState, create_app};
use automation_builder::vault::PlaceholderVault;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Identity provider that accepts `token-for-<subject>` bearer tokens and
/// serves canned profiles, so integration tests need no live provider.
pub struct StaticIdentity;

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn verify(&self, token: &str) -> Result<String, IdentityError> {
        token
            .strip_prefix("token-for-")
            .map(str::to_string)
            .ok_or_else(|| IdentityError::InvalidToken("unknown token".to_string()))
    }

    async fn profile(&self, subject: &str) -> Result<SubjectProfile, IdentityError> {
        Ok(SubjectProfile {
            email: format!("{subject}@example.com"),
            display_name: Some(subject.to_string()),
        })
    }
}

pub struct TestServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<Result<()>>>,
}

impl TestServerHandle {
    fn new(shutdown_tx: oneshot::Sender<()>, join_handle: JoinHandle<Result<()>>) -> Self {
        Self {
            shutdown_tx: Some(shutdown_tx),
            join_handle: Some(join_handle),
        }
    }

    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.join_handle.take() {
            handle.await.context("server task join failed")??;
        }

        Ok(())
    }
}

impl Drop for TestServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Spawns the full application on a random port with the static identity
/// provider, returning the base URL, the database handle, and a shutdown
/// handle.
pub async fn spawn_test_app() -> (String, Arc<DatabaseConnection>, TestServerHandle) {
    let db = Arc::new(setup_test_db().await.unwrap());

    let state = AppState {
        config: Arc::new(AppConfig::default()),
        db: Arc::clone(&db),
        identity: Arc::new(StaticIdentity),
        vault: Arc::new(PlaceholderVault),
    };
    let app = create_app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_url = format!("http://{}", addr);

    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        let _ = ready_tx.send(());

        server.await.context("axum server error")
    });

    ready_rx.await.expect("server task to signal readiness");

    (server_url, db, TestServerHandle::new(shutdown_tx, server_task))
}

/// Bearer header value for a static-identity subject.
pub fn bearer(subject: &str) -> String {
    format!("Bearer token-for-{subject}")
}
