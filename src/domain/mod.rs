//! # Domain Model
//!
//! Typed records for accounts and todo items. Storage returns and accepts
//! these types rather than untyped rows.

pub mod account;
pub mod id;
pub mod todo;

pub use account::{Account, AccountCredentials, NewAccount};
pub use id::{AccountId, TodoId};
pub use todo::{NewTodo, Todo, TodoChange, TodoPatch};
