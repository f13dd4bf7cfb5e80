//! User connection entity model
//!
//! This module contains the SeaORM entity model for the user_connections
//! table. Each row belongs to exactly one user and references exactly one
//! connector definition; encrypted_credentials holds the opaque blob from
//! the credential vault and must never leave the persistence layer.

use sea_orm::entity::prelude::*;

use super::connector_definition::Entity as ConnectorDefinition;
use super::user::Entity as User;

/// User connection entity representing one user's credentials for a connector.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_connections")]
pub struct Model {
    /// Surrogate identifier (primary key)
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning user
    pub user_id: i32,

    /// Connector definition this connection authenticates against
    pub connector_definition_id: i32,

    /// User-chosen display name for this connection
    pub connection_name: String,

    /// Opaque encrypted credential blob from the vault (never serialized)
    pub encrypted_credentials: String,

    /// Optional expiry for credentials that age out
    pub expires_at: Option<DateTimeWithTimeZone>,

    /// Whether the connection is currently usable
    pub active: bool,

    /// Timestamp when the connection was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the connection was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "User",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "ConnectorDefinition",
        from = "Column::ConnectorDefinitionId",
        to = "super::connector_definition::Column::Id"
    )]
    ConnectorDefinition,
}

impl Related<User> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<ConnectorDefinition> for Entity {
    fn to() -> RelationDef {
        Relation::ConnectorDefinition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
