use tempfile::TempDir;

use crate::{
    AppState,
    config::{AdminConfig, Config},
    db,
    models::NewUser,
};

pub const ADMIN_PASSWORD: &str = "admin-password";

/// Fresh SQLite file and poster directory. Keep the `TempDir` alive for the
/// length of the test.
pub async fn test_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display()),
        poster_dir: dir.path().join("images"),
        session_secret: None,
        bcrypt_cost: 4,
        admin: AdminConfig {
            email: "admin@localhost".to_string(),
            password: Some(ADMIN_PASSWORD.to_string()),
        },
    };

    let db = db::connect_and_migrate(&config.database_url).await.unwrap();
    let state = AppState::new(db, config).await.unwrap();
    (dir, state)
}

pub fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        firstname: None,
        lastname: None,
        password: format!("secret-{username}"),
    }
}
