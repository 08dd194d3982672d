//! Loader configuration
//!
//! Connection and data-directory settings, read from the process environment
//! once at startup. The loader itself only ever sees the resulting struct and
//! never touches ambient process state.

use std::fmt;
use std::path::PathBuf;

use crate::error::{LoaderError, LoaderResult};

/// Environment variable for the target database name (required)
pub const ENV_POSTGRES_DB: &str = "POSTGRES_DB";

/// Environment variable for the database user (required)
pub const ENV_POSTGRES_USER: &str = "POSTGRES_USER";

/// Environment variable for the database password (required)
pub const ENV_POSTGRES_PASSWORD: &str = "POSTGRES_PASSWORD";

/// Environment variable for the database host
pub const ENV_POSTGRES_HOST: &str = "POSTGRES_HOST";

/// Environment variable for the database port
pub const ENV_POSTGRES_PORT: &str = "POSTGRES_PORT";

/// Environment variable for the directory holding the raw CSV files
pub const ENV_STAGING_DATA_DIR: &str = "STAGING_DATA_DIR";

/// Default database host
pub const DEFAULT_HOST: &str = "postgres";

/// Default database port
pub const DEFAULT_PORT: u16 = 5432;

/// Default directory holding the raw CSV files
pub const DEFAULT_DATA_DIR: &str = "/data/raw";

/// Connection and input settings for a staging run
#[derive(Clone)]
pub struct LoaderConfig {
    /// Target database name
    pub database: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Directory holding the raw CSV files
    pub data_dir: PathBuf,
}

impl LoaderConfig {
    /// Build the configuration from the process environment.
    ///
    /// `POSTGRES_DB`, `POSTGRES_USER` and `POSTGRES_PASSWORD` are required;
    /// host, port and data directory fall back to defaults.
    pub fn from_env() -> LoaderResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests inject their own lookup so they never
    /// mutate the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LoaderResult<Self> {
        let database = require(&lookup, ENV_POSTGRES_DB)?;
        let user = require(&lookup, ENV_POSTGRES_USER)?;
        let password = require(&lookup, ENV_POSTGRES_PASSWORD)?;

        let host = lookup(ENV_POSTGRES_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(ENV_POSTGRES_PORT) {
            Some(raw) => raw.parse().map_err(|_| {
                LoaderError::Config(format!("{} is not a valid port: {}", ENV_POSTGRES_PORT, raw))
            })?,
            None => DEFAULT_PORT,
        };

        let data_dir = lookup(ENV_STAGING_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Ok(Self {
            database,
            user,
            password,
            host,
            port,
            data_dir,
        })
    }

    /// Build the tokio-postgres connection config.
    ///
    /// Constructed field by field so credentials never pass through
    /// connection-string escaping.
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.database);
        config
    }
}

// Manual Debug so the password cannot leak into logs.
impl fmt::Debug for LoaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderConfig")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"****")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> LoaderResult<String> {
    lookup(key).ok_or_else(|| LoaderError::Config(format!("{} is not set", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required() -> HashMap<String, String> {
        env(&[
            (ENV_POSTGRES_DB, "matches"),
            (ENV_POSTGRES_USER, "loader"),
            (ENV_POSTGRES_PASSWORD, "secret"),
        ])
    }

    #[test]
    fn test_defaults_apply_when_optional_vars_absent() {
        let vars = required();
        let config = LoaderConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.database, "matches");
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn test_optional_vars_override_defaults() {
        let mut vars = required();
        vars.insert(ENV_POSTGRES_HOST.to_string(), "db.internal".to_string());
        vars.insert(ENV_POSTGRES_PORT.to_string(), "6432".to_string());
        vars.insert(ENV_STAGING_DATA_DIR.to_string(), "/srv/raw".to_string());

        let config = LoaderConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6432);
        assert_eq!(config.data_dir, PathBuf::from("/srv/raw"));
    }

    #[test]
    fn test_missing_required_var_is_an_error() {
        let mut vars = required();
        vars.remove(ENV_POSTGRES_PASSWORD);

        let err = LoaderConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains(ENV_POSTGRES_PASSWORD));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let mut vars = required();
        vars.insert(ENV_POSTGRES_PORT.to_string(), "not-a-port".to_string());

        let err = LoaderConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains(ENV_POSTGRES_PORT));
    }

    #[test]
    fn test_debug_masks_password() {
        let vars = required();
        let config = LoaderConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("****"));
    }
}
