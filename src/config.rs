use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub poster_dir: PathBuf,
    pub session_secret: Option<String>,
    pub bcrypt_cost: u32,
    pub admin: AdminConfig,
}

/// The single administrator account, always named
/// [`ADMIN_USERNAME`](crate::auth::ADMIN_USERNAME). It is created at start-up
/// when a password is given.
#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub email: String,
    pub password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "8080".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://reelrate.db?mode=rwc".to_string());

        let poster_dir = std::env::var("POSTER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static/images"));

        let session_secret = std::env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty());
        if let Some(secret) = &session_secret {
            anyhow::ensure!(secret.len() >= 64, "SESSION_SECRET must be at least 64 bytes");
        }

        let bcrypt_cost: u32 = match std::env::var("BCRYPT_COST") {
            Ok(s) => s.parse().context("BCRYPT_COST")?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        let admin = AdminConfig {
            email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string()),
            password: std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
        };

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            poster_dir,
            session_secret,
            bcrypt_cost,
            admin,
        })
    }
}
