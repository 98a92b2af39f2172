//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Ledger Configuration Constants
// ============================================================================

/// Default exclusive upper bound for accepted numbers.
pub const DEFAULT_MAX_NUMBER: i64 = 100;

/// Audit log file name used under the base directory.
pub const DEFAULT_AUDIT_LOG_FILE: &str = "logs.txt";

// ============================================================================
// Database Configuration Constants
// ============================================================================

pub const DEFAULT_DATABASE_HOST: &str = "localhost";
pub const DEFAULT_DATABASE_PORT: u16 = 5432;
pub const DEFAULT_DATABASE_USER: &str = "postgres";
pub const DEFAULT_DATABASE_PASSWORD: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "numbers_db";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 1;

/// Default database acquire timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "*";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Number ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Exclusive upper bound; valid numbers are `1..=max_number - 1`
    pub max_number: i64,
    /// Audit log file, truncated on startup
    pub audit_log_path: PathBuf,
}

/// Database configuration
///
/// `url` wins over the discrete connection settings when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    /// Create the database on startup if it does not exist
    pub auto_create: bool,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_env();
        config.validate()?;

        Ok(config)
    }

    /// Read configuration from the process environment without validating it
    pub fn from_env() -> Self {
        let base_dir = std::env::var("APP_BASE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let audit_log_path = std::env::var("AUDIT_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base_dir.join(DEFAULT_AUDIT_LOG_FILE));

        Config {
            server: ServerConfig {
                host: env_string("NUMLEDGER_HOST", DEFAULT_SERVER_HOST),
                port: env_or("NUMLEDGER_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "NUMLEDGER_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            ledger: LedgerConfig {
                max_number: env_or("NUMLEDGER_MAX_NUMBER", DEFAULT_MAX_NUMBER),
                audit_log_path,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
                host: env_string("DB_HOST", DEFAULT_DATABASE_HOST),
                port: env_or("DB_PORT", DEFAULT_DATABASE_PORT),
                user: env_string("DB_USER", DEFAULT_DATABASE_USER),
                password: env_string("DB_PASSWORD", DEFAULT_DATABASE_PASSWORD),
                name: env_string("DB_NAME", DEFAULT_DATABASE_NAME),
                auto_create: env_or("DB_AUTO_CREATE", true),
                max_connections: env_or("DB_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: env_or("DB_MIN_CONNECTIONS", DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: env_or(
                    "DB_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                ),
                idle_timeout_secs: env_or("DB_IDLE_TIMEOUT", DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: env_string("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ALLOWED_ORIGIN)
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", false),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        // MAX must leave at least one valid number in [1, MAX-1]
        if self.ledger.max_number < 2 {
            anyhow::bail!(
                "Max number must be at least 2, got {}",
                self.ledger.max_number
            );
        }

        if self.ledger.audit_log_path.as_os_str().is_empty() {
            anyhow::bail!("Audit log path cannot be empty");
        }

        if self.database.url.is_none() && self.database.name.trim().is_empty() {
            anyhow::bail!("Database name cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.cors.allow_credentials && self.cors.allows_any_origin() {
            anyhow::bail!("CORS credentials cannot be combined with a wildcard origin");
        }

        Ok(())
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            ledger: LedgerConfig {
                max_number: DEFAULT_MAX_NUMBER,
                audit_log_path: PathBuf::from(".").join(DEFAULT_AUDIT_LOG_FILE),
            },
            database: DatabaseConfig {
                url: None,
                host: DEFAULT_DATABASE_HOST.to_string(),
                port: DEFAULT_DATABASE_PORT,
                user: DEFAULT_DATABASE_USER.to_string(),
                password: DEFAULT_DATABASE_PASSWORD.to_string(),
                name: DEFAULT_DATABASE_NAME.to_string(),
                auto_create: true,
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
            allow_credentials: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const TOUCHED_VARS: &[&str] = &[
        "APP_BASE_DIR",
        "AUDIT_LOG_PATH",
        "NUMLEDGER_MAX_NUMBER",
        "NUMLEDGER_PORT",
        "DB_HOST",
        "DB_PORT",
        "DB_NAME",
        "DATABASE_URL",
        "CORS_ALLOWED_ORIGINS",
    ];

    fn clear_env() {
        for var in TOUCHED_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ledger.max_number, 100);
        assert_eq!(config.database.name, "numbers_db");
        assert_eq!(config.database.port, 5432);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();

        let config = Config::from_env();
        assert_eq!(config.ledger.max_number, DEFAULT_MAX_NUMBER);
        assert_eq!(config.ledger.audit_log_path, PathBuf::from("./logs.txt"));
        assert!(config.database.url.is_none());
        assert_eq!(config.cors.allowed_origins, vec!["*".to_string()]);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("APP_BASE_DIR", "/srv/numledger");
        std::env::set_var("NUMLEDGER_MAX_NUMBER", "50");
        std::env::set_var("DB_HOST", "db.internal");
        std::env::set_var("DB_PORT", "6543");
        std::env::set_var("DB_NAME", "ledger");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test");

        let config = Config::from_env();
        assert_eq!(config.ledger.max_number, 50);
        assert_eq!(
            config.ledger.audit_log_path,
            PathBuf::from("/srv/numledger/logs.txt")
        );
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.name, "ledger");
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_audit_log_path_overrides_base_dir() {
        clear_env();
        std::env::set_var("APP_BASE_DIR", "/srv/numledger");
        std::env::set_var("AUDIT_LOG_PATH", "/var/log/audit.txt");

        let config = Config::from_env();
        assert_eq!(config.ledger.audit_log_path, PathBuf::from("/var/log/audit.txt"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparseable_values_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("NUMLEDGER_MAX_NUMBER", "lots");
        std::env::set_var("NUMLEDGER_PORT", "-1");

        let config = Config::from_env();
        assert_eq!(config.ledger.max_number, DEFAULT_MAX_NUMBER);
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);

        clear_env();
    }

    #[test]
    fn test_validate_rejects_small_max_number() {
        let mut config = Config::default();
        config.ledger.max_number = 1;
        assert!(config.validate().is_err());

        config.ledger.max_number = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_pool_bounds() {
        let mut config = Config::default();
        config.database.min_connections = 20;
        config.database.max_connections = 5;
        assert!(config.validate().is_err());

        config.database.max_connections = 0;
        config.database.min_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_credentials_with_wildcard() {
        let mut config = Config::default();
        config.cors.allow_credentials = true;
        assert!(config.validate().is_err());

        config.cors.allowed_origins = vec!["http://localhost:3000".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_database_name_without_url() {
        let mut config = Config::default();
        config.database.name = "  ".to_string();
        assert!(config.validate().is_err());

        config.database.url = Some("postgres://localhost/other".to_string());
        assert!(config.validate().is_ok());
    }
}
