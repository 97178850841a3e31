use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{
    middleware::authenticate, CredentialHasher, LoginService, TokenCodec, UserService,
};
use crate::config::{AppConfig, ServiceKind};
use crate::errors::Result;
use crate::observability::{metrics_handler, prometheus_handle, track_http_metrics};
use crate::storage::DbPool;
use crate::todos::TodoService;

use super::handlers::{
    create_admin_handler, create_todo_handler, delete_todo_handler, get_todo_handler,
    get_user_handler, health_handler, list_all_todos_handler, list_todos_handler,
    list_users_handler, login_handler, ready_handler, register_handler, update_todo_handler,
    verify_handler, HealthState,
};

/// State of the account directory service
#[derive(Clone)]
pub struct UserApiState {
    pub users: Arc<UserService>,
    pub login: Arc<LoginService>,
    pub codec: Arc<TokenCodec>,
}

impl UserApiState {
    pub fn from_config(pool: DbPool, config: &AppConfig) -> Result<Self> {
        let hasher = CredentialHasher::new(config.auth.bcrypt_cost);
        let codec = Arc::new(token_codec(config));
        let users = UserService::with_sqlx(pool.clone(), hasher, config.admin.clone());
        let login = LoginService::with_sqlx(pool, hasher, codec.clone())?;
        Ok(Self { users: Arc::new(users), login: Arc::new(login), codec })
    }
}

/// State of the todo service
#[derive(Clone)]
pub struct TodoApiState {
    pub todos: Arc<TodoService>,
    pub codec: Arc<TokenCodec>,
}

impl TodoApiState {
    pub fn from_config(pool: DbPool, config: &AppConfig) -> Self {
        Self { todos: Arc::new(TodoService::with_sqlx(pool)), codec: Arc::new(token_codec(config)) }
    }
}

fn token_codec(config: &AppConfig) -> TokenCodec {
    TokenCodec::new(config.auth.jwt_secret.as_bytes(), config.auth.token_expiry())
}

/// Router-level settings taken from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub service: String,
    pub admin_routes_require_auth: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_metrics: bool,
}

impl RouterSettings {
    pub fn from_config(kind: ServiceKind, config: &AppConfig) -> Self {
        Self {
            service: kind.name().to_string(),
            admin_routes_require_auth: config.auth.admin_routes_require_auth,
            enable_cors: config.server.enable_cors,
            cors_origins: config.server.cors_origins.clone(),
            enable_metrics: config.observability.enable_metrics,
        }
    }
}

/// Routes of the account directory service
pub fn build_user_router(state: UserApiState, pool: DbPool, settings: &RouterSettings) -> Router {
    let auth = || middleware::from_fn_with_state(state.codec.clone(), authenticate);

    let public = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/users/{id}", get(get_user_handler));

    let secured = Router::new().route("/verify", get(verify_handler)).route_layer(auth());

    let mut admin = Router::new()
        .route("/admin/users", get(list_users_handler))
        .route("/admin/create-admin", post(create_admin_handler));
    if settings.admin_routes_require_auth {
        admin = admin.route_layer(auth());
    }

    let api = public.merge(secured).merge(admin).with_state(state);
    finish(api, pool, settings)
}

/// Routes of the todo service; everything except health and metrics sits behind the gate
pub fn build_todo_router(state: TodoApiState, pool: DbPool, settings: &RouterSettings) -> Router {
    let auth = || middleware::from_fn_with_state(state.codec.clone(), authenticate);

    let secured = Router::new()
        .route("/todos", post(create_todo_handler).get(list_todos_handler))
        .route(
            "/todos/{id}",
            get(get_todo_handler).put(update_todo_handler).delete(delete_todo_handler),
        )
        .route_layer(auth());

    let mut admin = Router::new().route("/admin/todos", get(list_all_todos_handler));
    if settings.admin_routes_require_auth {
        admin = admin.route_layer(auth());
    }

    let api = secured.merge(admin).with_state(state);
    finish(api, pool, settings)
}

fn finish(api: Router, pool: DbPool, settings: &RouterSettings) -> Router {
    let probes = Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(HealthState { service: settings.service.clone(), pool });

    let mut router = api.merge(probes);
    if settings.enable_metrics {
        match prometheus_handle() {
            Ok(handle) => {
                let metrics =
                    Router::new().route("/metrics", get(metrics_handler)).with_state(handle);
                router = router.merge(metrics);
            }
            Err(err) => tracing::warn!(error = %err, "metrics endpoint disabled"),
        }
        router = router.route_layer(middleware::from_fn(track_http_metrics));
    }

    let router = if settings.enable_cors { router.layer(cors_layer(settings)) } else { router };
    router.layer(TraceLayer::new_for_http())
}

fn cors_layer(settings: &RouterSettings) -> CorsLayer {
    if settings.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(origin = %origin, error = %err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
}
