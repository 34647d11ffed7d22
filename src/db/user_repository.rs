use sqlx::SqlitePool;

use crate::models::User;

pub async fn insert_user(
    db: &SqlitePool,
    username: &str,
    hashed_password: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, hashed_password)
        VALUES (?1, ?2)
        RETURNING id, username, hashed_password
        "#,
    )
    .bind(username)
    .bind(hashed_password)
    .fetch_one(db)
    .await
}

pub async fn find_user_by_username(
    db: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, hashed_password FROM users WHERE username = ?1",
    )
    .bind(username)
    .fetch_optional(db)
    .await
}
