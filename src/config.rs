use std::env;
use std::net::SocketAddr;

use jsonwebtoken::Algorithm;

use crate::error::AppError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
/// Ten years.
const MAX_TOKEN_EXPIRE_MINUTES: i64 = 60 * 24 * 365 * 10;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_minutes: i64,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        Ok(Self {
            database_url,
            bind_addr,
            auth: AuthConfig::new_from_env()?,
        })
    }
}

impl AuthConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let config = Self {
            access_secret: required("JWT_SECRET_KEY")?,
            refresh_secret: required("JWT_REFRESH_SECRET_KEY")?,
            algorithm: parse_algorithm(&required("ALGORITHM")?)?,
            access_token_expire_minutes: parse_minutes("ACCESS_TOKEN_EXPIRE_MINUTES")?,
            refresh_token_expire_minutes: parse_minutes("REFRESH_TOKEN_EXPIRE_MINUTES")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(AppError::Config("JWT secrets must not be empty".to_string()));
        }
        if self.access_secret == self.refresh_secret {
            return Err(AppError::Config(
                "JWT_SECRET_KEY and JWT_REFRESH_SECRET_KEY must differ".to_string(),
            ));
        }
        if self.access_token_expire_minutes <= 0 || self.refresh_token_expire_minutes <= 0 {
            return Err(AppError::Config("token lifetimes must be positive".to_string()));
        }
        if self.access_token_expire_minutes > MAX_TOKEN_EXPIRE_MINUTES
            || self.refresh_token_expire_minutes > MAX_TOKEN_EXPIRE_MINUTES
        {
            return Err(AppError::Config(format!(
                "token lifetimes must not exceed {} minutes",
                MAX_TOKEN_EXPIRE_MINUTES
            )));
        }
        Ok(())
    }
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Config(format!("{} is not set", name)))
}

fn parse_minutes(name: &str) -> Result<i64, AppError> {
    required(name)?
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be an integer number of minutes", name)))
}

/// Only HMAC algorithms are usable with shared secrets.
pub fn parse_algorithm(value: &str) -> Result<Algorithm, AppError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(AppError::Config(format!("unsupported ALGORITHM: {}", other))),
    }
}
