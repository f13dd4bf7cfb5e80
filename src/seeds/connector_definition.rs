//! Connector definition seeding functionality
//!
//! Populates the connector catalog with the initial set of connectable
//! services. Seeding is idempotent: definitions that already exist are left
//! untouched, so it is safe to run on every startup.

use anyhow::Result;
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use std::sync::Arc;

use crate::models::connector_definition::{self, AuthType};
use crate::repositories::ConnectorDefinitionRepository;

/// Seeds the connector_definitions table with the initial catalog.
pub async fn seed_connector_definitions(db: &DatabaseConnection) -> Result<()> {
    let repo = ConnectorDefinitionRepository::new(Arc::new(db.clone()));

    for definition in catalog() {
        match repo.find_by_key(&definition.key).await {
            Ok(Some(_)) => {
                log::info!("Connector '{}' already exists, skipping", definition.key);
            }
            Ok(None) => {
                log::info!("Creating connector: {}", definition.key);
                let key = definition.key.clone();
                let now = Utc::now();
                let model = connector_definition::ActiveModel {
                    key: Set(definition.key),
                    name: Set(definition.name),
                    description: Set(definition.description),
                    logo_url: Set(definition.logo_url),
                    auth_type: Set(definition.auth_type),
                    credential_fields_schema: Set(definition.credential_fields_schema),
                    oauth2_client_id: Set(definition.oauth2_client_id),
                    oauth2_scopes: Set(definition.oauth2_scopes),
                    oauth2_authorization_url: Set(definition.oauth2_authorization_url),
                    oauth2_token_url: Set(definition.oauth2_token_url),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                    ..Default::default()
                };

                if let Err(e) = repo.create(model).await {
                    log::error!("Failed to create connector '{}': {}", key, e);
                    return Err(e.into());
                }
            }
            Err(e) => {
                log::error!("Error checking if connector '{}' exists: {}", definition.key, e);
                return Err(e.into());
            }
        }
    }

    log::info!("Connector seeding completed successfully");
    Ok(())
}

struct CatalogEntry {
    key: String,
    name: String,
    description: Option<String>,
    logo_url: Option<String>,
    auth_type: AuthType,
    credential_fields_schema: Option<String>,
    oauth2_client_id: Option<String>,
    oauth2_scopes: Option<String>,
    oauth2_authorization_url: Option<String>,
    oauth2_token_url: Option<String>,
}

fn catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            key: "slack".to_string(),
            name: "Slack".to_string(),
            description: Some("Send messages to Slack channels".to_string()),
            logo_url: Some("https://logos.example.com/slack.png".to_string()),
            auth_type: AuthType::Oauth2,
            credential_fields_schema: None,
            oauth2_client_id: Some("slack-client-id".to_string()),
            oauth2_scopes: Some("chat:write,channels:read".to_string()),
            oauth2_authorization_url: Some("https://slack.com/oauth/v2/authorize".to_string()),
            oauth2_token_url: Some("https://slack.com/api/oauth.v2.access".to_string()),
        },
        CatalogEntry {
            key: "google_sheets".to_string(),
            name: "Google Sheets".to_string(),
            description: Some("Read and append rows in Google Sheets".to_string()),
            logo_url: Some("https://logos.example.com/google-sheets.png".to_string()),
            auth_type: AuthType::Oauth2,
            credential_fields_schema: None,
            oauth2_client_id: Some("google-client-id".to_string()),
            oauth2_scopes: Some("https://www.googleapis.com/auth/spreadsheets".to_string()),
            oauth2_authorization_url: Some(
                "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            ),
            oauth2_token_url: Some("https://oauth2.googleapis.com/token".to_string()),
        },
        CatalogEntry {
            key: "sendgrid".to_string(),
            name: "SendGrid".to_string(),
            description: Some("Send transactional email via SendGrid".to_string()),
            logo_url: Some("https://logos.example.com/sendgrid.png".to_string()),
            auth_type: AuthType::ApiKey,
            credential_fields_schema: Some("{\"api_key\":\"string\"}".to_string()),
            oauth2_client_id: None,
            oauth2_scopes: None,
            oauth2_authorization_url: None,
            oauth2_token_url: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::MigratorTrait;
    use sea_orm::Database;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        seed_connector_definitions(&db).await.unwrap();
        seed_connector_definitions(&db).await.unwrap();

        let repo = ConnectorDefinitionRepository::new(Arc::new(db));
        let all = repo.list_all().await.unwrap();
        let keys: Vec<&str> = all.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["google_sheets", "sendgrid", "slack"]);
    }

    #[tokio::test]
    async fn seeded_catalog_has_expected_auth_types() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        seed_connector_definitions(&db).await.unwrap();

        let repo = ConnectorDefinitionRepository::new(Arc::new(db));
        let slack = repo.find_by_key("slack").await.unwrap().unwrap();
        assert_eq!(slack.auth_type, AuthType::Oauth2);
        assert!(slack.oauth2_token_url.is_some());

        let sendgrid = repo.find_by_key("sendgrid").await.unwrap().unwrap();
        assert_eq!(sendgrid.auth_type, AuthType::ApiKey);
        assert!(sendgrid.oauth2_client_id.is_none());
    }
}
