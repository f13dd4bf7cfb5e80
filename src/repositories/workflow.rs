//! Workflow repository for database operations
//!
//! This module provides the WorkflowRepository struct which encapsulates
//! SeaORM operations for the workflows table with owner-scoped methods.
//! Update and delete resolve the row and check ownership inside a single
//! transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;

use super::OwnedAccessError;
use crate::models::workflow::{self, Entity as Workflow};

/// Partial-patch payload for workflow updates.
///
/// Outer `None` means the field was omitted and stays unchanged. For the
/// nullable description, `Some(None)` is an explicit clear and is applied.
#[derive(Debug, Default, Clone)]
pub struct WorkflowPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub enabled: Option<bool>,
    pub trigger_config: Option<String>,
    pub action_config: Option<String>,
}

/// Repository for workflow database operations
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl WorkflowRepository {
    /// Creates a new WorkflowRepository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists all workflows owned by the given principal ordered by creation time then ID
    pub async fn list_by_owner(&self, user_id: i32) -> Result<Vec<workflow::Model>, DbErr> {
        Workflow::find()
            .filter(workflow::Column::UserId.eq(user_id))
            .order_by_asc(workflow::Column::CreatedAt)
            .order_by_asc(workflow::Column::Id)
            .all(&*self.db)
            .await
    }

    /// Resolves a workflow on behalf of a principal
    pub async fn get_owned(&self, id: i32, owner_id: i32) -> Result<workflow::Model, OwnedAccessError> {
        let workflow = Workflow::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or(OwnedAccessError::NotFound)?;

        if workflow.user_id != owner_id {
            return Err(OwnedAccessError::NotOwner);
        }

        Ok(workflow)
    }

    /// Creates a new workflow record bound to its owner
    pub async fn create(&self, workflow: workflow::ActiveModel) -> Result<workflow::Model, DbErr> {
        workflow.insert(&*self.db).await
    }

    /// Applies a partial patch to a workflow on behalf of a principal.
    ///
    /// Ownership check and mutation share one transaction; omitted patch
    /// fields are left untouched and an explicit description clear is
    /// persisted as NULL.
    pub async fn update_owned(
        &self,
        id: i32,
        owner_id: i32,
        patch: WorkflowPatch,
    ) -> Result<workflow::Model, OwnedAccessError> {
        let txn = self.db.begin().await?;

        let existing = Workflow::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(OwnedAccessError::NotFound)?;

        if existing.user_id != owner_id {
            return Err(OwnedAccessError::NotOwner);
        }

        let mut model: workflow::ActiveModel = existing.into();

        if let Some(name) = patch.name {
            model.name = Set(name);
        }
        if let Some(description) = patch.description {
            model.description = Set(description);
        }
        if let Some(enabled) = patch.enabled {
            model.enabled = Set(enabled);
        }
        if let Some(trigger_config) = patch.trigger_config {
            model.trigger_config = Set(trigger_config);
        }
        if let Some(action_config) = patch.action_config {
            model.action_config = Set(action_config);
        }
        model.updated_at = Set(Utc::now().into());

        let updated = model.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Deletes a workflow on behalf of a principal inside one transaction
    pub async fn delete_owned(&self, id: i32, owner_id: i32) -> Result<(), OwnedAccessError> {
        let txn = self.db.begin().await?;

        let workflow = Workflow::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(OwnedAccessError::NotFound)?;

        if workflow.user_id != owner_id {
            return Err(OwnedAccessError::NotOwner);
        }

        workflow.delete(&txn).await?;
        txn.commit().await?;

        Ok(())
    }
}
