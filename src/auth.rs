use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use tracing::info;

use crate::{
    config::AdminConfig,
    entities::user::{self, Role},
    error::{AppError, AppResult},
    models::NewUser,
};

/// Only an account with this name (compared case-insensitively) can hold
/// [`Role::Admin`].
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    cost: u32,
    /// Verified against when the username is unknown, so both failure paths
    /// spend the same bcrypt time.
    dummy_hash: String,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, cost: u32) -> AppResult<Self> {
        let dummy_hash = bcrypt::hash("reelrate-dummy-password", cost)?;
        Ok(Self { db, cost, dummy_hash })
    }

    pub async fn register(&self, new: NewUser) -> AppResult<user::Model> {
        if new.username.eq_ignore_ascii_case(ADMIN_USERNAME)
            || self.find_by_username(&new.username).await?.is_some()
        {
            return Err(AppError::DuplicateUsername);
        }
        if user::Entity::find()
            .filter(user::Column::Email.eq(new.email.as_str()))
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateEmail);
        }

        let hashed = self.hash_password(new.password).await?;
        let model = user::ActiveModel {
            username: Set(new.username),
            email: Set(new.email),
            firstname: Set(new.firstname),
            lastname: Set(new.lastname),
            password: Set(hashed),
            role: Set(Role::User),
            ..Default::default()
        };
        let created = model.insert(&self.db).await.map_err(AppError::from_user_insert)?;

        info!(user_id = created.id, username = %created.username, "user registered");
        Ok(created)
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let found = self.find_by_username(username).await?;
        let hash = found.as_ref().map_or_else(|| self.dummy_hash.clone(), |u| u.password.clone());

        let verified = verify_password(password.to_string(), hash).await?;
        match found {
            Some(user) if verified => {
                info!(user_id = user.id, "user logged in");
                Ok(user)
            },
            _ => Err(AppError::InvalidCredentials),
        }
    }

    /// Resolves a session's user id. A session whose user has since vanished
    /// resolves to nobody.
    pub async fn current_user(&self, user_id: Option<i32>) -> AppResult<Option<user::Model>> {
        let Some(id) = user_id else {
            return Ok(None);
        };
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn is_admin(&self, user_id: Option<i32>) -> AppResult<bool> {
        Ok(self.current_user(user_id).await?.is_some_and(|u| u.is_admin()))
    }

    /// Creates the administrator account, or promotes the existing account of
    /// that name. This is the only path that hands out [`Role::Admin`].
    pub async fn bootstrap_admin(&self, admin: &AdminConfig) -> AppResult<Option<i32>> {
        let Some(password) = admin.password.clone() else {
            return Ok(None);
        };

        if let Some(existing) = self.find_by_username(ADMIN_USERNAME).await? {
            if existing.role != Role::Admin {
                let mut active = existing.into_active_model();
                active.role = Set(Role::Admin);
                let promoted = active.update(&self.db).await?;
                info!(user_id = promoted.id, "promoted existing account to admin");
                return Ok(Some(promoted.id));
            }
            return Ok(Some(existing.id));
        }

        let model = user::ActiveModel {
            username: Set(ADMIN_USERNAME.to_string()),
            email: Set(admin.email.clone()),
            firstname: Set(None),
            lastname: Set(None),
            password: Set(self.hash_password(password).await?),
            role: Set(Role::Admin),
            ..Default::default()
        };
        let created = model.insert(&self.db).await.map_err(AppError::from_user_insert)?;
        info!(user_id = created.id, username = %created.username, "admin account created");
        Ok(Some(created.id))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let cost = self.cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}
