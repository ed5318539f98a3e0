use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::todo::errors::TodoError;
use crate::domain::todo::models::NewTodo;
use crate::domain::todo::models::SaveTodoCommand;
use crate::domain::todo::models::TimeRange;
use crate::domain::todo::models::Todo;
use crate::domain::todo::models::TodoId;
use crate::domain::todo::ports::TodoRepository;
use crate::domain::todo::ports::TodoServicePort;
use crate::domain::user::models::UserId;

/// Domain service implementation for todo operations.
pub struct TodoService<TR>
where
    TR: TodoRepository,
{
    repository: Arc<TR>,
}

impl<TR> TodoService<TR>
where
    TR: TodoRepository,
{
    pub fn new(repository: Arc<TR>) -> Self {
        Self { repository }
    }

    async fn find_owned(&self, owner: &UserId, id: &TodoId) -> Result<Todo, TodoError> {
        let todo = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id.to_string()))?;

        if todo.owner != *owner {
            tracing::warn!(
                todo_id = %id,
                owner = %todo.owner,
                caller = %owner,
                "Todo access by non-owner"
            );
            return Err(TodoError::PermissionDenied(id.to_string()));
        }

        Ok(todo)
    }
}

#[async_trait]
impl<TR> TodoServicePort for TodoService<TR>
where
    TR: TodoRepository,
{
    async fn list(&self, owner: &UserId, range: TimeRange) -> Result<Vec<Todo>, TodoError> {
        self.repository.list_between(owner, range).await
    }

    async fn save(&self, owner: &UserId, command: SaveTodoCommand) -> Result<Todo, TodoError> {
        match command.id {
            None => {
                self.repository
                    .insert(NewTodo {
                        owner: *owner,
                        category: command.category,
                        text: command.text,
                        limit_time: command.limit_time,
                        status: command.status,
                    })
                    .await
            }
            Some(id) => {
                let existing = self.find_owned(owner, &id).await?;
                let todo = Todo {
                    category: command.category,
                    text: command.text,
                    limit_time: command.limit_time,
                    status: command.status,
                    ..existing
                };
                self.repository.update(&todo).await?;
                Ok(todo)
            }
        }
    }

    async fn remove(&self, owner: &UserId, id: &TodoId) -> Result<(), TodoError> {
        self.find_owned(owner, id).await?;
        self.repository.delete(id).await
    }
}
