//! # Data Models
//!
//! This module contains all the data models used throughout the Automation
//! Builder API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod connector_definition;
pub mod user;
pub mod user_connection;
pub mod workflow;

pub use connector_definition::Entity as ConnectorDefinition;
pub use user::Entity as User;
pub use user_connection::Entity as UserConnection;
pub use workflow::Entity as Workflow;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "automation-builder".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// Overall status indicator
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
