//! Account directory service: registration, login and account lookup.

use anyhow::Context;
use todoplane::{
    api::{build_user_router, serve, RouterSettings, UserApiState},
    observability::{init_logging, log_config_info},
    storage::{create_pool, USER_MIGRATIONS},
    AppConfig, ServiceKind, APP_NAME, VERSION,
};
use tracing::info;

const SERVICE: ServiceKind = ServiceKind::Users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before any configuration is read; a missing file is fine
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let config = AppConfig::load(SERVICE).context("failed to load configuration")?;
    init_logging(&config.observability).context("failed to initialise logging")?;
    info!(app_name = APP_NAME, version = VERSION, service = %SERVICE, "Starting service");
    log_config_info(&config);

    let pool = create_pool(&config.database, &USER_MIGRATIONS)
        .await
        .context("failed to open user database")?;

    let state = UserApiState::from_config(pool.clone(), &config)?;
    let router = build_user_router(state, pool, &RouterSettings::from_config(SERVICE, &config));

    serve(router, &config.server.bind_address()).await?;
    Ok(())
}
