//! Runtime configuration.

use crate::error::{JoblyError, JoblyResult};

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/jobly";
const DEFAULT_POOL_MAX_SIZE: usize = 16;

/// Connection settings for the jobly data layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoblyConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub pool_max_size: usize,
    /// Apply embedded migrations when connecting.
    pub run_migrations: bool,
}

impl Default for JoblyConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            run_migrations: true,
        }
    }
}

impl JoblyConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `.env` (if present) and read the process environment.
    ///
    /// - `DATABASE_URL`
    /// - `JOBLY_POOL_MAX_SIZE`
    /// - `JOBLY_RUN_MIGRATIONS` (`true` / `false`)
    pub fn from_env() -> JoblyResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            config.database_url = url;
        }

        if let Some(raw) = lookup("JOBLY_POOL_MAX_SIZE") {
            let size: usize = raw.trim().parse().map_err(|_| {
                JoblyError::Config(format!("JOBLY_POOL_MAX_SIZE must be a number, got '{raw}'"))
            })?;
            if size == 0 {
                return Err(JoblyError::Config(
                    "JOBLY_POOL_MAX_SIZE must be at least 1".to_string(),
                ));
            }
            config.pool_max_size = size;
        }

        if let Some(raw) = lookup("JOBLY_RUN_MIGRATIONS") {
            config.run_migrations = match raw.trim() {
                "true" | "1" => true,
                "false" | "0" => false,
                other => {
                    return Err(JoblyError::Config(format!(
                        "JOBLY_RUN_MIGRATIONS must be true or false, got '{other}'"
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Set the database URL.
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    /// Set the maximum pool size.
    pub fn pool_max_size(mut self, size: usize) -> Self {
        self.pool_max_size = size;
        self
    }

    /// Enable or disable migrations on connect.
    pub fn run_migrations(mut self, enabled: bool) -> Self {
        self.run_migrations = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = JoblyConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, JoblyConfig::default());
        assert_eq!(config.database_url, "postgres://localhost/jobly");
        assert_eq!(config.pool_max_size, 16);
        assert!(config.run_migrations);
    }

    #[test]
    fn reads_all_keys() {
        let config = JoblyConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/jobly_test"),
            ("JOBLY_POOL_MAX_SIZE", "4"),
            ("JOBLY_RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            JoblyConfig::new()
                .database_url("postgres://db/jobly_test")
                .pool_max_size(4)
                .run_migrations(false)
        );
    }

    #[test]
    fn blank_database_url_keeps_default() {
        let config = JoblyConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(config.database_url, "postgres://localhost/jobly");
    }

    #[test]
    fn rejects_bad_numbers_and_flags() {
        let err = JoblyConfig::from_lookup(lookup_from(&[("JOBLY_POOL_MAX_SIZE", "many")]))
            .unwrap_err();
        assert!(matches!(err, JoblyError::Config(_)));

        assert!(JoblyConfig::from_lookup(lookup_from(&[("JOBLY_POOL_MAX_SIZE", "0")])).is_err());
        assert!(JoblyConfig::from_lookup(lookup_from(&[("JOBLY_RUN_MIGRATIONS", "maybe")])).is_err());
    }
}
