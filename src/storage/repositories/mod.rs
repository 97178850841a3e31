//! Repository modules for data access
//!
//! One repository per table. Each is a trait plus its `sqlx` implementation so
//! services can be exercised against any backing store.

pub mod account;
pub mod todo;

pub use account::{AccountRepository, SqlxAccountRepository};
pub use todo::{SqlxTodoRepository, TodoRepository};
