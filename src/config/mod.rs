//! Configuration loading for the Automation Builder API.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `BUILDER_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application configuration derived from `BUILDER_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// Firebase project that issued the ID tokens this API accepts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase_project_id: Option<String>,
    /// API key used for Identity Toolkit profile lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase_api_key: Option<String>,
    /// JWKS endpoint for ID token signature verification (overridable in tests).
    #[serde(default = "default_identity_jwks_url")]
    pub identity_jwks_url: String,
    /// Identity Toolkit accounts:lookup endpoint (overridable in tests).
    #[serde(default = "default_identity_lookup_url")]
    pub identity_lookup_url: String,
    /// Whether to seed the connector-definition catalog at startup.
    #[serde(default = "default_seed_connectors")]
    pub seed_connectors: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            firebase_project_id: None,
            firebase_api_key: None,
            identity_jwks_url: default_identity_jwks_url(),
            identity_lookup_url: default_identity_lookup_url(),
            seed_connectors: default_seed_connectors(),
        }
    }
}

impl AppConfig {
    /// Resolve the configured bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.api_bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr {
                value: self.api_bind_addr.clone(),
            })
    }

    /// Serialize the configuration for startup logging with secrets redacted.
    pub fn redacted_json(&self) -> Result<String, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            if obj.contains_key("FIREBASE_API_KEY") {
                obj.insert(
                    "FIREBASE_API_KEY".to_string(),
                    serde_json::Value::String("***".to_string()),
                );
            }
        }
        serde_json::to_string(&value)
    }
}

fn default_profile() -> String {
    "dev".to_string()
}

fn default_api_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "postgres://localhost:5432/automation_builder".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5_000
}

fn default_identity_jwks_url() -> String {
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
        .to_string()
}

fn default_identity_lookup_url() -> String {
    "https://identitytoolkit.googleapis.com/v1/accounts:lookup".to_string()
}

fn default_seed_connectors() -> bool {
    true
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read env file {path}: {source}")]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
    #[error("invalid bind address: {value}")]
    InvalidBindAddr { value: String },
}

/// Loads [`AppConfig`] from layered `.env` files and the process environment.
///
/// Layering order (later wins): `.env`, `.env.local`, `.env.<profile>`,
/// `.env.<profile>.local`, process environment.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads configuration from the layered sources.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut layered = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("BUILDER_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        let take = |layered: &mut BTreeMap<String, String>, key: &str| {
            layered.remove(key).filter(|v| !v.is_empty())
        };

        let profile = take(&mut layered, "PROFILE").unwrap_or_else(default_profile);
        let api_bind_addr = take(&mut layered, "API_BIND_ADDR").unwrap_or_else(default_api_bind_addr);
        let log_level = take(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level);
        let log_format = take(&mut layered, "LOG_FORMAT").unwrap_or_else(default_log_format);
        let database_url = take(&mut layered, "DATABASE_URL").unwrap_or_else(default_database_url);
        let db_max_connections = take(&mut layered, "DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = take(&mut layered, "DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);
        let firebase_project_id = take(&mut layered, "FIREBASE_PROJECT_ID");
        let firebase_api_key = take(&mut layered, "FIREBASE_API_KEY");
        let identity_jwks_url =
            take(&mut layered, "IDENTITY_JWKS_URL").unwrap_or_else(default_identity_jwks_url);
        let identity_lookup_url =
            take(&mut layered, "IDENTITY_LOOKUP_URL").unwrap_or_else(default_identity_lookup_url);
        let seed_connectors = take(&mut layered, "SEED_CONNECTORS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_seed_connectors);

        Ok(AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            firebase_project_id,
            firebase_api_key,
            identity_jwks_url,
            identity_lookup_url,
            seed_connectors,
        })
    }

    fn collect_layered_env(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = values
            .get("PROFILE")
            .cloned()
            .or_else(|| env::var("BUILDER_PROFILE").ok())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(self.base_dir.join(format!(".env.{profile}")), &mut values)?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{profile}.local")),
            &mut values,
        )?;

        Ok(values)
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::Dotenv {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("BUILDER_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(source) => Err(ConfigError::Dotenv { path, source }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let config = AppConfig::default();
        assert_eq!(config.profile, "dev");
        assert_eq!(config.api_bind_addr, "127.0.0.1:8080");
        assert_eq!(config.db_max_connections, 10);
        assert!(config.seed_connectors);
        assert!(config.firebase_project_id.is_none());
    }

    #[test]
    fn bind_addr_parses() {
        let config = AppConfig::default();
        let addr = config.bind_addr().unwrap();
        assert_eq!(addr.port(), 8080);

        let bad = AppConfig {
            api_bind_addr: "not-an-addr".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            bad.bind_addr(),
            Err(ConfigError::InvalidBindAddr { .. })
        ));
    }

    #[test]
    fn redacted_json_hides_api_key() {
        let config = AppConfig {
            firebase_api_key: Some("super-secret".to_string()),
            ..Default::default()
        };

        let json = config.redacted_json().unwrap();
        assert!(!json.contains("super-secret"));
        assert!(json.contains("***"));
    }

    #[test]
    fn loader_reads_layered_env_files() {
        let dir = std::env::temp_dir().join(format!("builder-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(".env"),
            "BUILDER_PROFILE=test\nBUILDER_DATABASE_URL=sqlite::memory:\nUNPREFIXED=ignored\n",
        )
        .unwrap();
        std::fs::write(dir.join(".env.test"), "BUILDER_LOG_LEVEL=debug\n").unwrap();

        let config = ConfigLoader::with_base_dir(dir.clone()).load().unwrap();
        assert_eq!(config.profile, "test");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.log_level, "debug");

        std::fs::remove_dir_all(dir).ok();
    }
}
