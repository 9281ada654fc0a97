//! TalentDesk - recruiting back-office API server

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::sync::Arc;
use talentdesk_backend::{
    auth::JwtHandler, config::Config, db::Database, routes::build_router, state::AppState,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let config = Config::parse();
    info!("🚀 TalentDesk API starting");

    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set, using the development secret. Do not run this in production");
    }

    let db = Database::open(&config.database_url)
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;
    info!("🗄️ Database ready at: {}", config.database_url);

    let jwt_handler = Arc::new(JwtHandler::new(&config.jwt_secret));
    let state = AppState::new(db, jwt_handler, config.bcrypt_cost);

    let seeded = state
        .users
        .ensure_default_admin(
            &config.admin_email,
            &config.admin_password,
            config.bcrypt_cost,
        )
        .await
        .context("Failed to seed admin account")?;
    if seeded.is_some() && config.uses_dev_admin_password() {
        warn!(
            "Admin {} was seeded with the default password; change it after first login",
            config.admin_email
        );
    }

    let app = build_router(state);

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("🎯 API server listening on {}", config.bind);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talentdesk_backend=debug,talentdesk=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
