//! Connector definition repository for database operations
//!
//! Connector definitions are read-mostly catalog rows with no owner; the API
//! only lists them and looks them up by key. Creation is used by startup
//! seeding.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;

use crate::models::connector_definition::{self, Entity as ConnectorDefinition};

/// Repository for connector definition database operations
#[derive(Debug, Clone)]
pub struct ConnectorDefinitionRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl ConnectorDefinitionRepository {
    /// Creates a new ConnectorDefinitionRepository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists the full catalog ordered by key
    pub async fn list_all(&self) -> Result<Vec<connector_definition::Model>, DbErr> {
        ConnectorDefinition::find()
            .order_by_asc(connector_definition::Column::Key)
            .all(&*self.db)
            .await
    }

    /// Finds a definition by its unique key
    pub async fn find_by_key(&self, key: &str) -> Result<Option<connector_definition::Model>, DbErr> {
        ConnectorDefinition::find()
            .filter(connector_definition::Column::Key.eq(key))
            .one(&*self.db)
            .await
    }

    /// Finds a definition by its surrogate id
    pub async fn find_by_id(&self, id: i32) -> Result<Option<connector_definition::Model>, DbErr> {
        ConnectorDefinition::find_by_id(id).one(&*self.db).await
    }

    /// Creates a new definition row (startup seeding only)
    pub async fn create(
        &self,
        definition: connector_definition::ActiveModel,
    ) -> Result<connector_definition::Model, DbErr> {
        definition.insert(&*self.db).await
    }
}
