use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} must be a number, got {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    pub server_host: String,
    pub server_port: u16,
    pub rate_limit_per_minute: u32,
    pub rate_limit_burst: u32,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| lookup(var).ok_or(ConfigError::Missing(var));
        let or_default = |var: &'static str, default: &str| {
            lookup(var).unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_minutes: parse_number(
                "JWT_EXPIRATION_MINUTES",
                or_default("JWT_EXPIRATION_MINUTES", "15"),
            )?,
            server_host: or_default("SERVER_HOST", "0.0.0.0"),
            server_port: parse_number("SERVER_PORT", or_default("SERVER_PORT", "3000"))?,
            rate_limit_per_minute: parse_number(
                "RATE_LIMIT_PER_MINUTE",
                or_default("RATE_LIMIT_PER_MINUTE", "1000"),
            )?,
            rate_limit_burst: parse_number(
                "RATE_LIMIT_BURST",
                or_default("RATE_LIMIT_BURST", "1000"),
            )?,
            admin_email: or_default("ADMIN_EMAIL", "admin@admin.com"),
            admin_password: or_default("ADMIN_PASSWORD", "Admin123!"),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}
