//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `SAIROI_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `SAIROI_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `SAIROI_AUTH__SESSION__COOKIE_SECURE=false` sets the `auth.session.cookie_secure` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use sairoi::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port`
//! - **Database**: `database.url`, `database.pool` - SQLite connection settings
//! - **Admin User**: `admin_email`, `admin_password` - Initial admin created on startup
//! - **Authentication**: `auth.session`, `auth.password`, `auth.security.cors`
//! - **Reporting**: `reporting.*` - Reporting windows and row limits
//! - **Seed data**: `seed.*` - Defaults written on first startup
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! SAIROI_PORT=8080
//!
//! # Point at a different database file
//! DATABASE_URL="sqlite:///var/lib/sairoi/sairoi.db"
//!
//! # Allow session cookies over plain HTTP during local development
//! SAIROI_AUTH__SESSION__COOKIE_SECURE=false
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::auth::password::Argon2Params;
use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "SAIROI_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Set from the `DATABASE_URL` environment variable; folded into `database.url` on load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// SQLite database settings
    pub database: DatabaseConfig,
    /// Email address for the initial admin user (created on first startup)
    pub admin_email: String,
    /// Password for the initial admin user. Without one the admin account is not created.
    pub admin_password: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Dashboard and export windows
    pub reporting: ReportingConfig,
    /// Defaults written to an empty database
    pub seed: SeedConfig,
    /// Export traces over OTLP (configured through the standard OTEL_* variables)
    pub enable_otel_export: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection string, e.g. `sqlite://sairoi.db`
    pub url: String,
    pub pool: PoolSettings,
}

/// Connection pool parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Session cookie configuration
    pub session: SessionConfig,
    /// Password validation rules
    pub password: PasswordConfig,
    /// CORS settings
    pub security: SecurityConfig,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Session lifetime
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Cookie name for session token
    pub cookie_name: String,
    /// Set Secure flag on cookies (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("strict", "lax", or "none")
    pub cookie_same_site: String,
}

/// Password validation rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl PasswordConfig {
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

/// Reporting windows and limits.
///
/// Requested day counts outside `1..=max` are clamped, never rejected.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportingConfig {
    /// Window used when the request does not name one
    pub default_days: i64,
    /// Largest window the dashboard will aggregate
    pub dashboard_max_days: i64,
    /// Largest window the CSV export will cover
    pub export_max_days: i64,
    /// Cap on events read for a dashboard view (newest first)
    pub dashboard_event_limit: i64,
    /// Number of recent sessions listed on the dashboard
    pub recent_sessions: usize,
}

/// Values written to an empty database at startup. Existing rows are never overwritten.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    /// Team the initial admin is placed in
    pub team_name: String,
    /// Initial blended hourly rate (currency per hour)
    pub blended_hourly_rate: f64,
    /// Mark every tool approved when no approval row exists yet
    pub approve_all_tools: bool,
    /// Insert the default category catalog
    pub default_categories: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            database: DatabaseConfig::default(),
            admin_email: "admin@example.com".to_string(),
            admin_password: None,
            auth: AuthConfig::default(),
            reporting: ReportingConfig::default(),
            seed: SeedConfig::default(),
            enable_otel_export: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://sairoi.db".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600, // 10 minutes
        }
    }
}

impl PoolSettings {
    /// Idle timeout for the pool; `None` when idle connections are kept forever.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(14 * 24 * 60 * 60), // 14 days
            cookie_name: "sairoi_session".to_string(),
            cookie_secure: true,
            cookie_same_site: "lax".to_string(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 64,
            // Secure defaults for production (Argon2id RFC recommendations)
            argon2_memory_kib: 19456, // 19 MB
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Url(Url::parse("http://localhost:3000").expect("static URL is valid"))],
            allow_credentials: true,
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            default_days: 7,
            dashboard_max_days: 90,
            export_max_days: 365,
            dashboard_event_limit: 5000,
            recent_sessions: 12,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            team_name: "Support".to_string(),
            blended_hourly_rate: 20.0,
            approve_all_tools: true,
            default_categories: true,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        let password = &self.auth.password;
        if password.min_length > password.max_length {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Invalid password configuration: min_length ({}) cannot be greater than max_length ({})",
                    password.min_length, password.max_length
                ),
            });
        }

        if password.min_length < 1 {
            return Err(Error::Internal {
                operation: "Config validation: Invalid password configuration: min_length must be at least 1".to_string(),
            });
        }

        if self.auth.session.timeout.as_secs() < 300 {
            return Err(Error::Internal {
                operation: "Config validation: session timeout is too short (minimum 5 minutes)".to_string(),
            });
        }

        if !matches!(self.auth.session.cookie_same_site.to_ascii_lowercase().as_str(), "strict" | "lax" | "none") {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: cookie_same_site must be one of strict, lax or none (got '{}')",
                    self.auth.session.cookie_same_site
                ),
            });
        }

        let reporting = &self.reporting;
        if reporting.dashboard_max_days < 1 || reporting.export_max_days < 1 || reporting.dashboard_event_limit < 1 {
            return Err(Error::Internal {
                operation: "Config validation: reporting limits must be at least 1".to_string(),
            });
        }

        if !(1..=reporting.dashboard_max_days).contains(&reporting.default_days) {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: reporting.default_days ({}) must be between 1 and dashboard_max_days ({})",
                    reporting.default_days, reporting.dashboard_max_days
                ),
            });
        }

        if !self.seed.blended_hourly_rate.is_finite() || self.seed.blended_hourly_rate < 0.0 {
            return Err(Error::Internal {
                operation: "Config validation: seed.blended_hourly_rate must be a non-negative number".to_string(),
            });
        }

        if self.auth.security.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            // SAIROI_CONFIG names the file itself and is not a config key
            .merge(Env::prefixed("SAIROI_").ignore(&["config"]).split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
