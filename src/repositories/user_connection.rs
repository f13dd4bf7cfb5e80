//! User connection repository for database operations
//!
//! This module provides the UserConnectionRepository struct which
//! encapsulates SeaORM operations for the user_connections table with
//! owner-scoped methods. Deletion resolves the row and checks ownership
//! inside a single transaction.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use std::sync::Arc;

use super::OwnedAccessError;
use crate::models::connector_definition;
use crate::models::user_connection::{self, Entity as UserConnection};

/// Repository for user connection database operations
#[derive(Debug, Clone)]
pub struct UserConnectionRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl UserConnectionRepository {
    /// Creates a new UserConnectionRepository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists all connections owned by the given principal, joined with their
    /// connector definitions for DTO projection.
    pub async fn list_by_owner(
        &self,
        user_id: i32,
    ) -> Result<Vec<(user_connection::Model, connector_definition::Model)>, DbErr> {
        let rows = UserConnection::find()
            .filter(user_connection::Column::UserId.eq(user_id))
            .find_also_related(connector_definition::Entity)
            .order_by_asc(user_connection::Column::CreatedAt)
            .order_by_asc(user_connection::Column::Id)
            .all(&*self.db)
            .await?;

        // The definition FK is NOT NULL, so a missing related row indicates
        // store corruption rather than a normal state.
        rows.into_iter()
            .map(|(connection, definition)| {
                definition
                    .map(|definition| (connection, definition))
                    .ok_or_else(|| {
                        DbErr::RecordNotFound("connector definition for connection".to_string())
                    })
            })
            .collect()
    }

    /// Creates a new connection record bound to its owner
    pub async fn create(
        &self,
        connection: user_connection::ActiveModel,
    ) -> Result<user_connection::Model, DbErr> {
        connection.insert(&*self.db).await
    }

    /// Deletes a connection on behalf of a principal.
    ///
    /// The row is resolved and its owner compared inside one transaction so
    /// the check and the delete cannot be split.
    pub async fn delete_owned(&self, id: i32, owner_id: i32) -> Result<(), OwnedAccessError> {
        let txn = self.db.begin().await?;

        let connection = UserConnection::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(OwnedAccessError::NotFound)?;

        if connection.user_id != owner_id {
            return Err(OwnedAccessError::NotOwner);
        }

        connection.delete(&txn).await?;
        txn.commit().await?;

        Ok(())
    }
}
