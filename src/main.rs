mod auth;
mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod interaction;
mod models;
mod posters;
mod queries;
mod routes;
mod session;
mod templates;
#[cfg(test)]
mod testutil;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth::AuthService, catalog::CatalogService, config::Config, interaction::InteractionService,
    posters::PosterStore, queries::QueryService,
};

/// Everything a request handler can reach. Each service holds its own handle
/// to the connection pool; cloning the state is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub interactions: InteractionService,
    pub queries: QueryService,
    pub cookie_key: Key,
}

impl AppState {
    pub async fn new(db: DatabaseConnection, config: Config) -> anyhow::Result<Self> {
        let cookie_key = match &config.session_secret {
            Some(secret) => Key::try_from(secret.as_bytes())
                .map_err(|e| anyhow::anyhow!("SESSION_SECRET: {e:?}"))?,
            None => {
                tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
                Key::generate()
            },
        };

        let auth = AuthService::new(db.clone(), config.bcrypt_cost)
            .context("initialising password hashing")?;
        if auth.bootstrap_admin(&config.admin).await?.is_none() {
            tracing::info!("ADMIN_PASSWORD not set, skipping admin bootstrap");
        }

        let posters = PosterStore::new(config.poster_dir.clone());

        Ok(Self {
            catalog: CatalogService::new(db.clone(), posters),
            interactions: InteractionService::new(db.clone()),
            queries: QueryService::new(db.clone()),
            auth,
            db,
            cookie_key,
            config: Arc::new(config),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,reelrate=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.addr;

    let db = db::connect_and_migrate(&config.database_url).await?;
    tokio::fs::create_dir_all(&config.poster_dir)
        .await
        .with_context(|| format!("creating {}", config.poster_dir.display()))?;

    let state = AppState::new(db, config).await?;

    let app = routes::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
