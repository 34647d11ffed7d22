pub mod patch;
pub mod todo;
pub mod user;

pub use patch::Patch;
pub use todo::{NewTodoRequest, Todo, UpdateTodoRequest};
pub use user::{Credentials, TokenPair, User, UserResponse};
