//! Connector definition entity model
//!
//! This module contains the SeaORM entity model for the connector_definitions
//! table, the ownerless catalog of services a user can connect to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Authentication mechanism required by a connector.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AuthType {
    /// Static API key credentials
    #[sea_orm(string_value = "API_KEY")]
    #[serde(rename = "API_KEY")]
    ApiKey,
    /// OAuth2 authorization-code credentials
    #[sea_orm(string_value = "OAUTH2")]
    #[serde(rename = "OAUTH2")]
    Oauth2,
}

/// Connector definition entity describing one connectable third-party service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "connector_definitions")]
pub struct Model {
    /// Surrogate identifier (primary key)
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stable unique key, e.g. "slack" (immutable)
    #[sea_orm(unique)]
    pub key: String,

    /// User-facing display name, e.g. "Slack"
    pub name: String,

    /// Longer description of the connector (optional)
    pub description: Option<String>,

    /// Logo reference for UI display (optional)
    pub logo_url: Option<String>,

    /// Authentication kind required by this connector
    pub auth_type: AuthType,

    /// Schema describing the credential fields the connector needs (opaque text)
    pub credential_fields_schema: Option<String>,

    /// OAuth2 client id (only meaningful when auth_type is OAUTH2)
    pub oauth2_client_id: Option<String>,

    /// Comma-separated OAuth2 scopes (OAUTH2 only)
    pub oauth2_scopes: Option<String>,

    /// OAuth2 authorization endpoint (OAUTH2 only)
    pub oauth2_authorization_url: Option<String>,

    /// OAuth2 token endpoint (OAUTH2 only)
    pub oauth2_token_url: Option<String>,

    /// Timestamp when the definition was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the definition was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_connection::Entity")]
    UserConnection,
}

impl Related<super::user_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserConnection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
