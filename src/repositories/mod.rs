//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities. Owner-scoped repositories take the
//! resolved principal id explicitly and enforce ownership inside the same
//! transaction as the mutation.

use thiserror::Error;

pub mod connector_definition;
pub mod user;
pub mod user_connection;
pub mod workflow;

pub use connector_definition::ConnectorDefinitionRepository;
pub use user::UserRepository;
pub use user_connection::UserConnectionRepository;
pub use workflow::{WorkflowPatch, WorkflowRepository};

use crate::error::{ApiError, forbidden, not_found};

/// Outcome of resolving an owner-scoped row on behalf of a principal.
///
/// `NotFound` and `NotOwner` are deliberately distinct so the API layer can
/// keep 404 and 403 apart without conflating "doesn't exist" with "not
/// yours".
#[derive(Debug, Error)]
pub enum OwnedAccessError {
    #[error("resource not found")]
    NotFound,
    #[error("resource is owned by another user")]
    NotOwner,
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

impl From<OwnedAccessError> for ApiError {
    fn from(error: OwnedAccessError) -> Self {
        match error {
            OwnedAccessError::NotFound => not_found(None),
            // Generic message; error text must not confirm anything about
            // another user's resources.
            OwnedAccessError::NotOwner => forbidden(None),
            OwnedAccessError::Db(db_err) => db_err.into(),
        }
    }
}
