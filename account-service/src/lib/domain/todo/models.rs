use std::fmt;

use crate::domain::todo::errors::CategoryError;
use crate::domain::todo::errors::TodoError;
use crate::domain::todo::errors::TodoTextError;
use crate::domain::user::models::UserId;

/// A todo item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub owner: UserId,
    pub category: Category,
    pub text: TodoText,
    /// Deadline as unix seconds, 0 when there is none
    pub limit_time: i64,
    pub status: TodoStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Free-form grouping label of at most 10 characters, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category(String);

impl Category {
    const MAX_LENGTH: usize = 10;

    pub fn new(category: String) -> Result<Self, CategoryError> {
        let length = category.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(CategoryError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(category))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Todo description, 1 to 200 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoText(String);

impl TodoText {
    const MAX_LENGTH: usize = 200;

    pub fn new(text: String) -> Result<Self, TodoTextError> {
        let length = text.chars().count();
        if length == 0 {
            Err(TodoTextError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(TodoTextError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TodoStatus {
    #[default]
    Open,
    Done,
}

impl TodoStatus {
    pub fn code(self) -> i16 {
        match self {
            TodoStatus::Open => 0,
            TodoStatus::Done => 1,
        }
    }
}

impl TryFrom<i16> for TodoStatus {
    type Error = TodoError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TodoStatus::Open),
            1 => Ok(TodoStatus::Done),
            other => Err(TodoError::InvalidStatus(other)),
        }
    }
}

/// Todo content before the store assigns its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub owner: UserId,
    pub category: Category,
    pub text: TodoText,
    pub limit_time: i64,
    pub status: TodoStatus,
}

/// Create (no id) or overwrite (existing id) a todo of the caller.
#[derive(Debug, Clone)]
pub struct SaveTodoCommand {
    pub id: Option<TodoId>,
    pub category: Category,
    pub text: TodoText,
    pub limit_time: i64,
    pub status: TodoStatus,
}

/// Inclusive range of deadlines, unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: i64,
    end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Result<Self, TodoError> {
        if start > end {
            return Err(TodoError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn contains(&self, time: i64) -> bool {
        self.start <= time && time <= self.end
    }
}
