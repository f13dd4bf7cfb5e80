//! Database seeding functionality
//!
//! This module provides functionality to seed the database with initial data.
//! Currently only the connector-definition catalog is seeded; it is
//! read-mostly data the API never creates on behalf of users.

pub mod connector_definition;

pub use connector_definition::seed_connector_definitions;
