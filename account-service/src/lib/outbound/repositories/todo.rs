use async_trait::async_trait;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::todo::errors::TodoError;
use crate::domain::todo::models::Category;
use crate::domain::todo::models::NewTodo;
use crate::domain::todo::models::TimeRange;
use crate::domain::todo::models::Todo;
use crate::domain::todo::models::TodoId;
use crate::domain::todo::models::TodoStatus;
use crate::domain::todo::models::TodoText;
use crate::domain::todo::ports::TodoRepository;
use crate::domain::user::models::UserId;

#[derive(Debug, FromRow)]
struct TodoRow {
    id: i64,
    owner_id: i64,
    category: String,
    text: String,
    limit_time: i64,
    status: i16,
}

impl TryFrom<TodoRow> for Todo {
    type Error = TodoError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        Ok(Todo {
            id: TodoId(row.id),
            owner: UserId(row.owner_id),
            category: Category::new(row.category)?,
            text: TodoText::new(row.text)?,
            limit_time: row.limit_time,
            status: TodoStatus::try_from(row.status)?,
        })
    }
}

pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, TodoError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            INSERT INTO todos (owner_id, category, text, limit_time, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, category, text, limit_time, status
            "#,
        )
        .bind(todo.owner.0)
        .bind(todo.category.as_str())
        .bind(todo.text.as_str())
        .bind(todo.limit_time)
        .bind(todo.status.code())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| TodoError::DatabaseError(e.to_string()))?;

        Todo::try_from(row)
    }

    async fn update(&self, todo: &Todo) -> Result<(), TodoError> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET category = $2, text = $3, limit_time = $4, status = $5
            WHERE id = $1
            "#,
        )
        .bind(todo.id.0)
        .bind(todo.category.as_str())
        .bind(todo.text.as_str())
        .bind(todo.limit_time)
        .bind(todo.status.code())
        .execute(&self.pool)
        .await
        .map_err(|e| TodoError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(todo.id.to_string()));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, TodoError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, owner_id, category, text, limit_time, status
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TodoError::DatabaseError(e.to_string()))?;

        row.map(Todo::try_from).transpose()
    }

    async fn list_between(
        &self,
        owner: &UserId,
        range: TimeRange,
    ) -> Result<Vec<Todo>, TodoError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, owner_id, category, text, limit_time, status
            FROM todos
            WHERE owner_id = $1 AND limit_time BETWEEN $2 AND $3
            ORDER BY limit_time, id
            "#,
        )
        .bind(owner.0)
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TodoError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Todo::try_from).collect()
    }

    async fn delete(&self, id: &TodoId) -> Result<(), TodoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| TodoError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
