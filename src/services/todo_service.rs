use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, error, info, warn};

use crate::db::todo_repository;
use crate::error::AppError;
use crate::models::{NewTodoRequest, Todo, UpdateTodoRequest};

/// Todo operations. Every mutation runs in one transaction that is
/// committed on success and rolled back on any persistence failure.
#[derive(Clone)]
pub struct TodoService {
    db: SqlitePool,
}

impl TodoService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create_todo(&self, req: NewTodoRequest) -> Result<Todo, AppError> {
        if req.text.is_empty() {
            return Err(AppError::Validation("Text cannot be empty.".to_string()));
        }

        let mut tx = self.db.begin().await?;
        let result = todo_repository::insert_todo(&mut *tx, req).await;
        let todo = finish(tx, result).await?;

        info!("created todo {}", todo.id);
        Ok(todo)
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, AppError> {
        Ok(todo_repository::fetch_todos(&self.db).await?)
    }

    pub async fn list_done_todos(&self) -> Result<Vec<Todo>, AppError> {
        Ok(todo_repository::fetch_done_todos(&self.db).await?)
    }

    /// Returns `Ok(None)` when no todo has `id`; nothing is written then.
    pub async fn update_todo(
        &self,
        id: i64,
        req: UpdateTodoRequest,
    ) -> Result<Option<Todo>, AppError> {
        if req.is_empty() {
            debug!("update of todo {} supplies no fields", id);
        }

        let mut tx = self.db.begin().await?;
        let result = async {
            let Some(mut todo) = todo_repository::find_todo_by_id(&mut *tx, id).await? else {
                return Ok(None);
            };
            req.apply(&mut todo);
            todo_repository::save_todo(&mut *tx, &todo).await?;
            Ok::<_, sqlx::Error>(Some(todo))
        }
        .await;

        let updated = finish(tx, result).await?;
        match &updated {
            Some(_) => info!("updated todo {}", id),
            None => warn!("update: todo {} not found", id),
        }
        Ok(updated)
    }

    /// Returns `Ok(false)` when no todo has `id`.
    pub async fn delete_todo(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.db.begin().await?;
        let result = async {
            if todo_repository::find_todo_by_id(&mut *tx, id).await?.is_none() {
                return Ok(false);
            }
            todo_repository::delete_todo(&mut *tx, id).await
        }
        .await;

        let deleted = finish(tx, result).await?;
        if deleted {
            info!("deleted todo {}", id);
        } else {
            warn!("delete: todo {} not found", id);
        }
        Ok(deleted)
    }
}

/// Commits on success. On failure rolls back and reports the original error.
async fn finish<T>(
    tx: Transaction<'_, Sqlite>,
    result: Result<T, sqlx::Error>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            error!("rolling back transaction: {}", e);
            if let Err(rollback_err) = tx.rollback().await {
                error!("rollback failed: {}", rollback_err);
            }
            Err(AppError::Database(e))
        }
    }
}
