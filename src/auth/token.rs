use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Issues and checks access and refresh tokens.
///
/// The two token kinds are signed with separate secrets, so a refresh token
/// never verifies as an access token and vice versa.
#[derive(Clone, Debug)]
pub struct TokenService {
    config: AuthConfig,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn create_access_token(
        &self,
        subject: impl ToString,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        let ttl = match ttl {
            Some(ttl) => ttl,
            None => minutes(self.config.access_token_expire_minutes)?,
        };
        create_token(subject, ttl, &self.config.access_secret, self.config.algorithm)
    }

    pub fn create_refresh_token(
        &self,
        subject: impl ToString,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        let ttl = match ttl {
            Some(ttl) => ttl,
            None => minutes(self.config.refresh_token_expire_minutes)?,
        };
        create_token(subject, ttl, &self.config.refresh_secret, self.config.algorithm)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<String, AuthError> {
        verify_token(token, &self.config.access_secret, self.config.algorithm)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<String, AuthError> {
        verify_token(token, &self.config.refresh_secret, self.config.algorithm)
    }
}

pub fn create_token(
    subject: impl ToString,
    ttl: Duration,
    secret: &str,
    algorithm: Algorithm,
) -> Result<String, AuthError> {
    let exp = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AuthError::Encoding(format!("token lifetime out of range: {}", ttl)))?;
    let claims = Claims {
        sub: subject.to_string(),
        exp: exp.timestamp(),
    };
    encode(
        &Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Encoding(e.to_string()))
}

fn minutes(value: i64) -> Result<Duration, AuthError> {
    Duration::try_minutes(value).ok_or_else(|| {
        AuthError::Encoding(format!("token lifetime out of range: {} minutes", value))
    })
}

/// Checks signature and expiry and returns the token subject.
pub fn verify_token(token: &str, secret: &str, algorithm: Algorithm) -> Result<String, AuthError> {
    let mut validation = Validation::new(algorithm);
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims.sub)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid,
        })
}
