use std::sync::{Arc, OnceLock};

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::{TokenService, hash_password, verify_password};
use crate::db::user_repository;
use crate::error::AppError;
use crate::models::{Credentials, TokenPair, User};

const BEARER: &str = "bearer";

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Hash checked against when the username does not exist.
fn dummy_hash() -> &'static str {
    DUMMY_HASH.get_or_init(|| hash_password("not-a-real-password").unwrap_or_default())
}

pub struct AuthService {
    db: SqlitePool,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(db: SqlitePool, tokens: Arc<TokenService>) -> Self {
        Self { db, tokens }
    }

    pub async fn register(&self, creds: Credentials) -> Result<User, AppError> {
        let username = creds.username.trim().to_string();
        if username.is_empty() || creds.password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let password = creds.password;
        let hashed = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|_| AppError::InternalServerError)??;

        match user_repository::insert_user(&self.db, &username, &hashed).await {
            Ok(user) => {
                info!("registered user {}", user.username);
                Ok(user)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                format!("Username {} is already taken", username),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Unknown users and wrong passwords are reported identically, and both
    /// pay for one Argon2 verification.
    pub async fn login(&self, creds: Credentials) -> Result<TokenPair, AppError> {
        let rejected = || AppError::Unauthorized("Incorrect username or password".to_string());

        let username = creds.username.trim();
        let user = user_repository::find_user_by_username(&self.db, username).await?;

        let hashed = user.as_ref().map(|u| u.hashed_password.clone());
        let password = creds.password;
        let valid = tokio::task::spawn_blocking(move || match hashed {
            Some(hashed) => verify_password(&password, &hashed),
            None => {
                verify_password(&password, dummy_hash());
                false
            }
        })
        .await
        .map_err(|_| AppError::InternalServerError)?;

        let user = match user {
            Some(user) if valid => user,
            Some(user) => {
                warn!("login: wrong password for {}", user.username);
                return Err(rejected());
            }
            None => {
                warn!("login: unknown user {}", username);
                return Err(rejected());
            }
        };

        info!("issued tokens for {}", user.username);
        Ok(TokenPair {
            access_token: self.tokens.create_access_token(&user.username, None)?,
            refresh_token: self.tokens.create_refresh_token(&user.username, None)?,
            token_type: BEARER.to_string(),
        })
    }

    /// Exchanges a refresh token for a new access token for the same subject.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let subject = self.tokens.verify_refresh_token(refresh_token).inspect_err(|e| {
            warn!("refresh rejected: {}", e);
        })?;
        Ok(self.tokens.create_access_token(subject, None)?)
    }
}
