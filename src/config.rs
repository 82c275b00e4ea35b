// src/config.rs

//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DB_USER` - database role
//! - `DB_NAME` - database name
//! - `JWT_SECRET` - bearer token signing secret (min 32 chars)
//!
//! ## Optional
//! - `DB_HOST` (default: localhost)
//! - `DB_PORT` (default: 5432)
//! - `DB_PASSWORD` (default: empty)
//! - `DB_POOL_SIZE` (default: 10)
//! - `HOST` (default: 0.0.0.0)
//! - `PORT` (default: 3434)
//! - `TOKEN_TTL_SECS` (default: 3600)
//! - `STATIC_DIR` (default: public)

use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Connection settings for the relational store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub name: String,
    /// Upper bound on pooled connections.
    pub pool_size: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.name)
    }
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: IpAddr,
    pub port: u16,
    pub jwt_secret: SecretString,
    /// Lifetime of issued bearer tokens, in seconds.
    pub token_ttl_secs: i64,
    /// Directory holding the storefront entry page.
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig {
            host: optional(&lookup, "DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&lookup, "DB_PORT", 5432)?,
            user: required(&lookup, "DB_USER")?,
            password: SecretString::from(optional(&lookup, "DB_PASSWORD").unwrap_or_default()),
            name: required(&lookup, "DB_NAME")?,
            pool_size: parse_or(&lookup, "DB_POOL_SIZE", 10)?,
        };

        if database.pool_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "DB_POOL_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::InsecureSecret(
                "JWT_SECRET".to_string(),
                format!("must be at least {MIN_JWT_SECRET_LENGTH} characters"),
            ));
        }

        let token_ttl_secs: i64 = parse_or(&lookup, "TOKEN_TTL_SECS", 3600)?;
        if token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "TOKEN_TTL_SECS".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            database,
            host: parse_or(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or(&lookup, "PORT", 3434)?,
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl_secs,
            static_dir: optional(&lookup, "STATIC_DIR")
                .map_or_else(|| PathBuf::from("public"), PathBuf::from),
        })
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DB_USER", "shop"),
            ("DB_NAME", "shopfront"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.pool_size, 10);
        assert_eq!(config.port, 3434);
        assert_eq!(config.token_ttl_secs, 3600);
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.host, IpAddr::from([0, 0, 0, 0]));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_USER", "shop"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_NAME", "shopfront"),
            ("DB_POOL_SIZE", "4"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("JWT_SECRET", SECRET),
            ("TOKEN_TTL_SECS", "60"),
            ("STATIC_DIR", "/srv/www"),
        ]))
        .unwrap();

        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.password.expose_secret(), "hunter2");
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_ttl_secs, 60);
        assert_eq!(config.static_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_missing_required() {
        let err = AppConfig::from_lookup(lookup_from(&[("DB_NAME", "x"), ("JWT_SECRET", SECRET)]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "DB_USER"));

        let err = AppConfig::from_lookup(lookup_from(&[("DB_USER", "x"), ("DB_NAME", "x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "JWT_SECRET"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DB_USER", "x"),
            ("DB_NAME", "x"),
            ("JWT_SECRET", "short"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(..)));
    }

    #[test]
    fn test_invalid_numbers() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DB_USER", "x"),
            ("DB_NAME", "x"),
            ("JWT_SECRET", SECRET),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PORT"));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("DB_USER", "x"),
            ("DB_NAME", "x"),
            ("JWT_SECRET", SECRET),
            ("DB_POOL_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "DB_POOL_SIZE"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DB_USER", "x"),
            ("DB_NAME", "x"),
            ("DB_PASSWORD", "hunter2"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains(SECRET));
    }
}
