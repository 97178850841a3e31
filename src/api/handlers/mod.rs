//! HTTP handlers for both services.

pub mod health;
pub mod todos;
pub mod users;

pub use health::{health_handler, ready_handler, HealthResponse, HealthState, ReadinessResponse};
pub use todos::{
    create_todo_handler, delete_todo_handler, get_todo_handler, list_all_todos_handler,
    list_todos_handler, update_todo_handler, CreateTodoRequest, MessageResponse,
    UpdateTodoRequest,
};
pub use users::{
    create_admin_handler, get_user_handler, list_users_handler, login_handler, register_handler,
    verify_handler, CreateAdminResponse, LoginRequest, RegisterRequest, VerifyResponse,
};
