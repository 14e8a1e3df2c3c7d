use family_fund::{
    api::{self, AppState},
    config::{self, database},
    core::{auth::TokenKeys, settings, user},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Seed default settings and the bootstrap admin, never overwriting
    let seeded = settings::seed_default_settings(&db).await?;
    if seeded > 0 {
        info!("Seeded {} default settings.", seeded);
    }
    if let Some(admin) = &app_config.admin {
        if user::ensure_admin(&db, admin).await? {
            info!("Created bootstrap admin {}", admin.email);
        }
    } else {
        warn!("No [admin] section configured; no admin account will be created.");
    }

    // 6. Token keys. JWT_SECRET is read here, directly before use, not stored in AppConfig
    let secret = env::var("JWT_SECRET")
        .inspect_err(|e| error!("JWT_SECRET not found: {}", e))
        .map_err(Error::EnvVar)?;
    let keys = TokenKeys::new(secret.as_bytes(), app_config.auth.token_ttl_hours);

    // 7. Serve
    let bind_address = app_config.server.bind_address.clone();
    let state = AppState::new(db, app_config, keys);
    let listener = TcpListener::bind(&bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_address, e))?;
    info!("Family fund API listening on {}", bind_address);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
