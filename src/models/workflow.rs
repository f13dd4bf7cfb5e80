//! Workflow entity model
//!
//! This module contains the SeaORM entity model for the workflows table.
//! Trigger and action configurations are opaque text blobs; this layer
//! persists and serves them without interpretation.

use sea_orm::entity::prelude::*;

use super::user::Entity as User;

/// Workflow entity representing one owner-scoped automation definition.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "workflows")]
pub struct Model {
    /// Surrogate identifier (primary key)
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning user
    pub user_id: i32,

    /// Workflow name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Whether the workflow is enabled (definitions default to disabled)
    pub enabled: bool,

    /// Opaque trigger configuration blob
    pub trigger_config: String,

    /// Opaque action configuration blob
    pub action_config: String,

    /// Timestamp when the workflow was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the workflow was last updated
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
}

impl Related<User> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
