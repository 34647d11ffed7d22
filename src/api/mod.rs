use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::routing::{delete, patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::*;
use crate::services::{AuthService, TodoService};
use crate::state::AppState;

#[derive(Deserialize)]
struct CreateTodoParams {
    text: String,
    #[serde(default)]
    is_complete: bool,
}

#[derive(Deserialize)]
struct UpdateTodoParams {
    #[serde(default)]
    text: Patch<String>,
    #[serde(default)]
    is_complete: Patch<bool>,
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/create", post(create_todo))
        .route("/todo", get(list_todos))
        .route("/done", get(list_done_todos))
        .route("/update/{id}", patch(update_todo))
        .route("/delete/{id}", delete(delete_todo))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn create_todo(
    State(state): State<AppState>,
    params: Result<Query<CreateTodoParams>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(params) = params?;
    let req = NewTodoRequest {
        text: params.text,
        is_done: params.is_complete,
    };
    let todo = TodoService::new(state.db).create_todo(req).await?;
    Ok(Json(json!({ "todo added": todo.text })))
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = TodoService::new(state.db).list_todos().await?;
    Ok(Json(todos))
}

async fn list_done_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = TodoService::new(state.db).list_done_todos().await?;
    Ok(Json(todos))
}

async fn update_todo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    params: Result<Query<UpdateTodoParams>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Query(params) = params?;
    let req = UpdateTodoRequest {
        text: params.text,
        is_done: params.is_complete,
    };
    TodoService::new(state.db)
        .update_todo(id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(json!({ "todo updated": id })))
}

async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    if TodoService::new(state.db).delete_todo(id).await? {
        Ok(Json(json!({ "todo deleted": id })))
    } else {
        Err(AppError::NotFound)
    }
}

async fn signup(
    State(state): State<AppState>,
    creds: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(creds) = creds?;
    let user = AuthService::new(state.db, state.tokens).register(creds).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn login(
    State(state): State<AppState>,
    creds: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenPair>, AppError> {
    let Json(creds) = creds?;
    let pair = AuthService::new(state.db, state.tokens).login(creds).await?;
    Ok(Json(pair))
}

async fn refresh(
    State(state): State<AppState>,
    req: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = req?;
    let access_token = AuthService::new(state.db, state.tokens)
        .refresh(&req.refresh_token)
        .await?;
    Ok(Json(json!({ "access_token": access_token, "token_type": "bearer" })))
}

async fn me(user: AuthUser) -> Json<Value> {
    Json(json!({ "username": user.username }))
}
