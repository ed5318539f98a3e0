use async_trait::async_trait;

use crate::domain::todo::errors::TodoError;
use crate::domain::todo::models::NewTodo;
use crate::domain::todo::models::SaveTodoCommand;
use crate::domain::todo::models::TimeRange;
use crate::domain::todo::models::Todo;
use crate::domain::todo::models::TodoId;
use crate::domain::user::models::UserId;

/// Port for owner-scoped todo operations.
#[async_trait]
pub trait TodoServicePort: Send + Sync + 'static {
    /// List the owner's todos whose deadline falls in `range`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list(&self, owner: &UserId, range: TimeRange) -> Result<Vec<Todo>, TodoError>;

    /// Insert a new todo, or overwrite one the owner already has.
    ///
    /// # Returns
    /// The stored todo
    ///
    /// # Errors
    /// * `NotFound` - No todo with the given id
    /// * `PermissionDenied` - Todo belongs to another user
    /// * `DatabaseError` - Database operation failed
    async fn save(&self, owner: &UserId, command: SaveTodoCommand) -> Result<Todo, TodoError>;

    /// Remove a todo the owner has.
    ///
    /// # Errors
    /// * `NotFound` - No todo with the given id
    /// * `PermissionDenied` - Todo belongs to another user
    /// * `DatabaseError` - Database operation failed
    async fn remove(&self, owner: &UserId, id: &TodoId) -> Result<(), TodoError>;
}

/// Persistence operations for todos.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, TodoError>;

    /// # Errors
    /// * `NotFound` - Todo does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, todo: &Todo) -> Result<(), TodoError>;

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, TodoError>;

    /// Todos of `owner` with `limit_time` inside the inclusive range.
    async fn list_between(&self, owner: &UserId, range: TimeRange)
        -> Result<Vec<Todo>, TodoError>;

    /// # Errors
    /// * `NotFound` - Todo does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &TodoId) -> Result<(), TodoError>;
}
