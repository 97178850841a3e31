//! Todo repository for the todo service
//!
//! Every owner-facing query carries `user_id = $owner` in its WHERE clause, so
//! an item that belongs to someone else is indistinguishable from one that
//! does not exist.

use crate::domain::{AccountId, NewTodo, Todo, TodoChange, TodoId, TodoPatch};
use crate::errors::{Result, TodoplaneError};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use tracing::instrument;

const TODO_COLUMNS: &str = "id, title, description, completed, user_id, created_at";

#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Insert an item owned by `owner`; `completed` starts false
    async fn create(&self, owner: AccountId, todo: NewTodo) -> Result<Todo>;

    /// Items owned by `owner`, newest first
    async fn list_for_owner(&self, owner: AccountId) -> Result<Vec<Todo>>;

    async fn get_owned(&self, id: TodoId, owner: AccountId) -> Result<Option<Todo>>;

    /// Apply the present fields of `patch`. `None` when the item is absent or not owned.
    async fn update_owned(
        &self,
        id: TodoId,
        owner: AccountId,
        patch: &TodoPatch,
    ) -> Result<Option<Todo>>;

    /// `false` when the item is absent or not owned
    async fn delete_owned(&self, id: TodoId, owner: AccountId) -> Result<bool>;

    /// Every item across owners, newest first
    async fn list_all(&self) -> Result<Vec<Todo>>;
}

#[derive(Debug, Clone)]
pub struct SqlxTodoRepository {
    pool: DbPool,
}

impl SqlxTodoRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for SqlxTodoRepository {
    #[instrument(skip(self, todo), fields(owner = %owner), name = "db_create_todo")]
    async fn create(&self, owner: AccountId, todo: NewTodo) -> Result<Todo> {
        sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todos (title, description, completed, user_id, created_at) \
             VALUES ($1, $2, 0, $3, $4) RETURNING {TODO_COLUMNS}"
        ))
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(owner)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| TodoplaneError::database(err, "Failed to create todo"))
    }

    #[instrument(skip(self), fields(owner = %owner), name = "db_list_todos")]
    async fn list_for_owner(&self, owner: AccountId) -> Result<Vec<Todo>> {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| TodoplaneError::database(err, "Failed to list todos"))
    }

    #[instrument(skip(self), fields(todo_id = %id, owner = %owner), name = "db_get_todo")]
    async fn get_owned(&self, id: TodoId, owner: AccountId) -> Result<Option<Todo>> {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| TodoplaneError::database(err, "Failed to fetch todo"))
    }

    #[instrument(skip(self, patch), fields(todo_id = %id, owner = %owner), name = "db_update_todo")]
    async fn update_owned(
        &self,
        id: TodoId,
        owner: AccountId,
        patch: &TodoPatch,
    ) -> Result<Option<Todo>> {
        if patch.is_empty() {
            return self.get_owned(id, owner).await;
        }

        // Write before reading: under WAL a transaction holding a stale read
        // snapshot cannot upgrade to the write lock.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| TodoplaneError::database(err, "Failed to begin todo update"))?;

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE todos SET ");
        let mut assignments = builder.separated(", ");
        for change in patch.changes() {
            assignments.push(change.column());
            assignments.push_unseparated(" = ");
            match change {
                TodoChange::Title(title) => assignments.push_bind_unseparated(title),
                TodoChange::Description(description) => {
                    assignments.push_bind_unseparated(description)
                }
                TodoChange::Completed(completed) => assignments.push_bind_unseparated(completed),
            };
        }
        builder.push(" WHERE id = ").push_bind(id).push(" AND user_id = ").push_bind(owner);

        let result = builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|err| TodoplaneError::database(err, "Failed to update todo"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let updated = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| TodoplaneError::database(err, "Failed to reload updated todo"))?;

        tx.commit()
            .await
            .map_err(|err| TodoplaneError::database(err, "Failed to commit todo update"))?;

        Ok(Some(updated))
    }

    #[instrument(skip(self), fields(todo_id = %id, owner = %owner), name = "db_delete_todo")]
    async fn delete_owned(&self, id: TodoId, owner: AccountId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(|err| TodoplaneError::database(err, "Failed to delete todo"))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), name = "db_list_all_todos")]
    async fn list_all(&self) -> Result<Vec<Todo>> {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"
        ))
            .fetch_all(&self.pool)
            .await
            .map_err(|err| TodoplaneError::database(err, "Failed to list all todos"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::storage::migrations::TODO_MIGRATIONS;
    use crate::storage::pool::create_pool;
    use crate::storage::test_helpers::memory_pool;
    use std::sync::Arc;

    const ALICE: AccountId = AccountId::new(1);
    const BOB: AccountId = AccountId::new(2);

    fn new_todo(title: &str, description: Option<&str>) -> NewTodo {
        NewTodo { title: title.to_string(), description: description.map(str::to_string) }
    }

    async fn repo() -> SqlxTodoRepository {
        SqlxTodoRepository::new(memory_pool(&TODO_MIGRATIONS).await)
    }

    #[tokio::test]
    async fn create_stamps_owner_and_defaults() {
        let repo = repo().await;
        let todo = repo.create(ALICE, new_todo("buy milk", None)).await.unwrap();

        assert_eq!(todo.id, TodoId::new(1));
        assert_eq!(todo.user_id, ALICE);
        assert!(!todo.completed);
        assert_eq!(todo.description, None);
    }

    #[tokio::test]
    async fn other_owner_cannot_see_or_touch_item() {
        let repo = repo().await;
        let todo = repo.create(ALICE, new_todo("secret plan", Some("details"))).await.unwrap();

        assert!(repo.get_owned(todo.id, BOB).await.unwrap().is_none());
        let patch = TodoPatch { completed: Some(true), ..Default::default() };
        assert!(repo.update_owned(todo.id, BOB, &patch).await.unwrap().is_none());
        assert!(!repo.delete_owned(todo.id, BOB).await.unwrap());
        assert!(repo.list_for_owner(BOB).await.unwrap().is_empty());

        let still_there = repo.get_owned(todo.id, ALICE).await.unwrap().unwrap();
        assert!(!still_there.completed);
    }

    #[tokio::test]
    async fn partial_update_leaves_other_fields() {
        let repo = repo().await;
        let todo = repo.create(ALICE, new_todo("buy milk", Some("2 litres"))).await.unwrap();

        let patch = TodoPatch { completed: Some(true), ..Default::default() };
        let updated = repo.update_owned(todo.id, ALICE, &patch).await.unwrap().unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "buy milk");
        assert_eq!(updated.description.as_deref(), Some("2 litres"));
        assert_eq!(updated.created_at, todo.created_at);

        let patch = TodoPatch { title: Some("buy oat milk".into()), ..Default::default() };
        let updated = repo.update_owned(todo.id, ALICE, &patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "buy oat milk");
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn empty_patch_returns_item_unchanged() {
        let repo = repo().await;
        let todo = repo.create(ALICE, new_todo("buy milk", None)).await.unwrap();

        let same = repo.update_owned(todo.id, ALICE, &TodoPatch::default()).await.unwrap();
        assert_eq!(same, Some(todo));
        let missing = repo.update_owned(TodoId::new(42), ALICE, &TodoPatch::default()).await;
        assert!(missing.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_then_lookup_is_absent() {
        let repo = repo().await;
        let todo = repo.create(ALICE, new_todo("buy milk", None)).await.unwrap();

        assert!(repo.delete_owned(todo.id, ALICE).await.unwrap());
        assert!(repo.get_owned(todo.id, ALICE).await.unwrap().is_none());
        assert!(!repo.delete_owned(todo.id, ALICE).await.unwrap());
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_admin_sees_all() {
        let repo = repo().await;
        repo.create(ALICE, new_todo("first", None)).await.unwrap();
        repo.create(BOB, new_todo("bob's", None)).await.unwrap();
        repo.create(ALICE, new_todo("second", None)).await.unwrap();
        repo.create(ALICE, new_todo("third", None)).await.unwrap();

        let titles: Vec<_> =
            repo.list_for_owner(ALICE).await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].title, "third");
        assert_eq!(all[2].user_id, BOB);
    }

    #[tokio::test]
    async fn concurrent_updates_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("todos.db").display()),
            max_connections: 10,
            ..Default::default()
        };
        let pool = create_pool(&config, &TODO_MIGRATIONS).await.unwrap();
        let repo = Arc::new(SqlxTodoRepository::new(pool.clone()));
        let todo = repo.create(ALICE, new_todo("buy milk", None)).await.unwrap();

        let mut handles = Vec::new();
        for n in 0..40 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                let patch =
                    TodoPatch { title: Some(format!("buy milk #{n}")), ..Default::default() };
                repo.update_owned(todo.id, ALICE, &patch).await
            }));
        }

        for handle in handles {
            let updated = handle.await.unwrap().unwrap();
            assert!(updated.is_some());
        }

        let latest = repo.get_owned(todo.id, ALICE).await.unwrap().unwrap();
        assert!(latest.title.starts_with("buy milk #"));
        pool.close().await;
    }
}
