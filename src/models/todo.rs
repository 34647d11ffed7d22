use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Patch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub is_done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodoRequest {
    pub text: String,
    #[serde(default)]
    pub is_done: bool,
}

/// Fields of a partial update. Only `Patch::Value` fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub text: Patch<String>,
    #[serde(default)]
    pub is_done: Patch<bool>,
}

impl UpdateTodoRequest {
    pub fn is_empty(&self) -> bool {
        !self.text.is_supplied() && !self.is_done.is_supplied()
    }

    pub fn apply(self, todo: &mut Todo) {
        if let Patch::Value(text) = self.text {
            todo.text = text;
        }
        if let Patch::Value(is_done) = self.is_done {
            todo.is_done = is_done;
        }
    }
}
