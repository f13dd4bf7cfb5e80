//! User entity model
//!
//! This module contains the SeaORM entity model for the users table, the
//! local principals mapped from verified external identity subjects.

use sea_orm::entity::prelude::*;

/// User entity representing a local principal provisioned from a verified
/// identity token.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Surrogate identifier (primary key)
    #[sea_orm(primary_key)]
    pub id: i32,

    /// External subject identifier from the identity provider (unique, immutable)
    #[sea_orm(unique)]
    pub firebase_uid: String,

    /// Email address reported by the identity provider (unique)
    #[sea_orm(unique)]
    pub email: String,

    /// Display name reported by the identity provider (optional)
    pub display_name: Option<String>,

    /// Timestamp when the user was first provisioned
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the user was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::workflow::Entity")]
    Workflow,
    #[sea_orm(has_many = "super::user_connection::Entity")]
    UserConnection,
}

impl Related<super::workflow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workflow.def()
    }
}

impl Related<super::user_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserConnection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
