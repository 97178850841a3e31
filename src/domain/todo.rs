//! Todo items owned by exactly one account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{AccountId, TodoId};

/// Stored representation of a todo item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Owner; stamped from the caller's token at creation and never changed
    pub user_id: AccountId,
    pub created_at: DateTime<Utc>,
}

/// Fields a caller may supply when creating a todo. The owner is not one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
}

/// Partial update. `None` means "leave the stored value alone".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// One present field of a [`TodoPatch`], tied to a fixed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoChange<'a> {
    Title(&'a str),
    Description(&'a str),
    Completed(bool),
}

impl TodoChange<'_> {
    pub fn column(&self) -> &'static str {
        match self {
            TodoChange::Title(_) => "title",
            TodoChange::Description(_) => "description",
            TodoChange::Completed(_) => "completed",
        }
    }
}

impl TodoPatch {
    /// Present fields only, in a stable order.
    pub fn changes(&self) -> Vec<TodoChange<'_>> {
        let mut changes = Vec::with_capacity(3);
        if let Some(title) = self.title.as_deref() {
            changes.push(TodoChange::Title(title));
        }
        if let Some(description) = self.description.as_deref() {
            changes.push(TodoChange::Description(description));
        }
        if let Some(completed) = self.completed {
            changes.push(TodoChange::Completed(completed));
        }
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}
