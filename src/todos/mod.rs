//! Todo items, scoped to the account that created them.

pub mod service;

pub use service::TodoService;
