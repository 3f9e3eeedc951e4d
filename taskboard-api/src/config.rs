/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file loaded
/// first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `API_HSTS`: Send `Strict-Transport-Security` (default: false)
/// - `JWT_SECRET`: Secret key for JWT signing, at least 32 characters (required)
/// - `SESSION_TTL_HOURS`: How long a sign-in stays valid, 1-8760 (default: 720)
/// - `RUST_LOG`: Log filter (default: taskboard_api=debug,tower_http=debug)
/// - `LOG_FORMAT`: `json` for structured logs (read in `main`)
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use taskboard_shared::db::pool::DatabaseConfig as PoolConfig;

/// Minimum accepted `JWT_SECRET` length
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Longest accepted `SESSION_TTL_HOURS` (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 8760;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Whether to send HSTS (only behind HTTPS)
    pub hsts: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub jwt_secret: String,

    /// Session lifetime in hours
    pub session_ttl_hours: i64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - `SESSION_TTL_HOURS` is outside 1-8760
    /// - A numeric or boolean variable does not parse
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("API_PORT", 8080u16)?;
        let cors_origins = parse_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));
        let hsts = parse_var("API_HSTS", false)?;

        let url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 10u32)?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        let session_ttl_hours = parse_var("SESSION_TTL_HOURS", 720i64)?;

        let config = Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                hsts,
            },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                session_ttl_hours,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but are not usable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.auth.session_ttl_hours) {
            anyhow::bail!(
                "SESSION_TTL_HOURS must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            );
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }
        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin is allowed
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }

    /// Pool settings for [`taskboard_shared::db::pool::create_pool`]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                hsts: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                session_ttl_hours: 720,
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());

        let mut short = config();
        short.auth.jwt_secret = "too-short".to_string();
        assert!(short.validate().is_err());

        let mut ttl = config();
        ttl.auth.session_ttl_hours = 0;
        assert!(ttl.validate().is_err());
    }

    #[test]
    fn test_session_ttl_upper_bound() {
        let mut c = config();
        c.auth.session_ttl_hours = MAX_SESSION_TTL_HOURS;
        assert!(c.validate().is_ok());

        c.auth.session_ttl_hours = MAX_SESSION_TTL_HOURS + 1;
        assert!(c.validate().is_err());

        c.auth.session_ttl_hours = 3_000_000_000;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.example.com, https://b.example.com,"),
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_cors_permissive() {
        let mut c = config();
        assert!(c.cors_permissive());

        c.api.cors_origins = vec!["https://app.example.com".to_string()];
        assert!(!c.cors_permissive());
    }

    #[test]
    fn test_pool_config() {
        let pool = config().pool_config();
        assert_eq!(pool.url, "postgresql://localhost/test");
        assert_eq!(pool.max_connections, 10);
        assert_eq!(pool.acquire_timeout_seconds, 30);
    }
}
