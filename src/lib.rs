//! # Automation Builder API Library
//!
//! This library provides the core functionality for the Automation Builder
//! API service: Firebase-backed authentication, owner-scoped resource
//! stores, and the HTTP surface that projects them as JSON.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub mod vault;
pub use migration;
