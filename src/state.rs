use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: Arc<TokenService>,
}
