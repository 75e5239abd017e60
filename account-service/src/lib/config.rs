use std::env;
use std::fmt;

use auth::Authenticator;
use auth::JwtHandler;
use auth::PasswordHasher;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: i64,
}

/// Argon2id work factor for newly hashed passwords.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_expiration_hours() -> i64 {
    auth::DEFAULT_TOKEN_TTL_HOURS
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        Self::load_from("config", &run_mode, Environment::default())
    }

    /// Layer `{dir}/default`, then `{dir}/{run_mode}`, then `environment` with `__` as
    /// the nesting separator.
    pub fn load_from(
        dir: &str,
        run_mode: &str,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name(&format!("{}/default", dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // No prefix: JWT__SECRET overrides jwt.secret
            .add_source(environment.separator("__").try_parsing(true))
            .build()?;

        configuration.try_deserialize()
    }

    /// Build the process-wide authenticator from the jwt and password sections.
    ///
    /// # Errors
    /// * Empty signing secret, token lifetime not positive or out of range, invalid Argon2 parameters
    pub fn authenticator(&self) -> Result<Authenticator, anyhow::Error> {
        if self.jwt.expiration_hours <= 0 {
            anyhow::bail!(
                "jwt.expiration_hours must be positive, got {}",
                self.jwt.expiration_hours
            );
        }

        let password_hasher = PasswordHasher::with_params(
            self.password.memory_kib,
            self.password.iterations,
            self.password.parallelism,
        )?;
        let ttl = chrono::Duration::try_hours(self.jwt.expiration_hours).ok_or_else(|| {
            anyhow::anyhow!(
                "jwt.expiration_hours out of range, got {}",
                self.jwt.expiration_hours
            )
        })?;
        let jwt_handler = JwtHandler::new(self.jwt.secret.as_bytes(), ttl)?;

        Ok(Authenticator::new(password_hasher, jwt_handler))
    }
}
