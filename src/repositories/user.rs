//! User repository for database operations
//!
//! This module provides the UserRepository struct which encapsulates SeaORM
//! operations for the users table, including the idempotent first-sight
//! provisioning path used by the authorization gate.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;

use crate::error::is_unique_violation;
use crate::models::user::{self, Entity as User};

/// Repository for user (principal) database operations
#[derive(Debug, Clone)]
pub struct UserRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Creates a new UserRepository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Finds a user by their external subject identifier
    pub async fn find_by_firebase_uid(&self, firebase_uid: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::FirebaseUid.eq(firebase_uid))
            .one(&*self.db)
            .await
    }

    /// Creates a user record for a newly seen subject.
    ///
    /// Idempotent under concurrency: when two first-sight requests race, the
    /// losing insert hits the unique constraint on firebase_uid and is
    /// resolved by re-reading the winner's row, so at most one principal
    /// exists per subject.
    pub async fn create(
        &self,
        firebase_uid: &str,
        email: &str,
        display_name: Option<String>,
    ) -> Result<user::Model, DbErr> {
        let now = Utc::now();
        let new_user = user::ActiveModel {
            firebase_uid: Set(firebase_uid.to_string()),
            email: Set(email.to_string()),
            display_name: Set(display_name),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        match new_user.insert(&*self.db).await {
            Ok(created) => Ok(created),
            Err(err) if is_unique_violation(&err) => {
                tracing::debug!(firebase_uid, "Lost first-sight race, re-reading principal");
                self.find_by_firebase_uid(firebase_uid)
                    .await?
                    .ok_or(err)
            }
            Err(err) => Err(err),
        }
    }
}
