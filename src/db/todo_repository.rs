use sqlx::{Executor, Sqlite};

use crate::models::{NewTodoRequest, Todo};

pub async fn insert_todo<'e, E>(db: E, req: NewTodoRequest) -> Result<Todo, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Todo>(
        "INSERT INTO todos (text, is_done) VALUES (?1, ?2) RETURNING id, text, is_done",
    )
    .bind(req.text)
    .bind(req.is_done)
    .fetch_one(db)
    .await
}

pub async fn fetch_todos<'e, E>(db: E) -> Result<Vec<Todo>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Todo>("SELECT id, text, is_done FROM todos ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn fetch_done_todos<'e, E>(db: E) -> Result<Vec<Todo>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Todo>("SELECT id, text, is_done FROM todos WHERE is_done = 1 ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn find_todo_by_id<'e, E>(db: E, id: i64) -> Result<Option<Todo>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Todo>("SELECT id, text, is_done FROM todos WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn save_todo<'e, E>(db: E, todo: &Todo) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE todos SET text = ?1, is_done = ?2 WHERE id = ?3")
        .bind(&todo.text)
        .bind(todo.is_done)
        .bind(todo.id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn delete_todo<'e, E>(db: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
