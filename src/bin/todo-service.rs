//! Todo service: items scoped to the account named in the bearer token.

use anyhow::Context;
use todoplane::{
    api::{build_todo_router, serve, RouterSettings, TodoApiState},
    observability::{init_logging, log_config_info},
    storage::{create_pool, TODO_MIGRATIONS},
    AppConfig, ServiceKind, APP_NAME, VERSION,
};
use tracing::info;

const SERVICE: ServiceKind = ServiceKind::Todos;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let config = AppConfig::load(SERVICE).context("failed to load configuration")?;
    init_logging(&config.observability).context("failed to initialise logging")?;
    info!(app_name = APP_NAME, version = VERSION, service = %SERVICE, "Starting service");
    log_config_info(&config);

    let pool = create_pool(&config.database, &TODO_MIGRATIONS)
        .await
        .context("failed to open todo database")?;

    let state = TodoApiState::from_config(pool.clone(), &config);
    let router = build_todo_router(state, pool, &RouterSettings::from_config(SERVICE, &config));

    serve(router, &config.server.bind_address()).await?;
    Ok(())
}
