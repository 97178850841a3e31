//! Ownership-scoped access to todo items.
//!
//! Every operation takes the caller's [`AccountId`] from the verified token.
//! An item owned by another account is reported exactly like a missing one.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{AccountId, NewTodo, Todo, TodoId, TodoPatch};
use crate::errors::{Error, Result};
use crate::storage::repositories::{SqlxTodoRepository, TodoRepository};
use crate::storage::DbPool;

#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn TodoRepository>,
}

fn not_found(id: TodoId) -> Error {
    Error::not_found("Todo", id.to_string())
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoRepository>) -> Self {
        Self { todos }
    }

    pub fn with_sqlx(pool: DbPool) -> Self {
        Self::new(Arc::new(SqlxTodoRepository::new(pool)))
    }

    #[instrument(skip(self, todo), fields(owner = %owner))]
    pub async fn create(&self, owner: AccountId, todo: NewTodo) -> Result<Todo> {
        let created = self.todos.create(owner, todo).await?;
        info!(todo_id = %created.id, owner = %owner, "todo created");
        Ok(created)
    }

    pub async fn list(&self, owner: AccountId) -> Result<Vec<Todo>> {
        self.todos.list_for_owner(owner).await
    }

    #[instrument(skip(self), fields(todo_id = %id, owner = %owner))]
    pub async fn get(&self, owner: AccountId, id: TodoId) -> Result<Todo> {
        self.todos.get_owned(id, owner).await?.ok_or_else(|| not_found(id))
    }

    /// Apply the present fields of `patch`; an empty patch returns the item as stored.
    #[instrument(skip(self, patch), fields(todo_id = %id, owner = %owner))]
    pub async fn update(&self, owner: AccountId, id: TodoId, patch: TodoPatch) -> Result<Todo> {
        self.todos.update_owned(id, owner, &patch).await?.ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self), fields(todo_id = %id, owner = %owner))]
    pub async fn delete(&self, owner: AccountId, id: TodoId) -> Result<()> {
        if self.todos.delete_owned(id, owner).await? {
            info!(todo_id = %id, "todo deleted");
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    /// Every item across owners.
    pub async fn list_all(&self) -> Result<Vec<Todo>> {
        self.todos.list_all().await
    }
}
