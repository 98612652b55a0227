use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Username already exists!")]
    DuplicateUsername,
    #[error("Email already registered!")]
    DuplicateEmail,
    #[error("Username or password incorrect!")]
    InvalidCredentials,
    #[error("Access denied!")]
    AccessDenied,
    #[error("Movie not found!")]
    NotFound,
    #[error("{0}")]
    InvalidForm(String),
    #[error("could not decode poster: {0}")]
    ImageDecode(String),
    #[error("database error: {0}")]
    Persistence(#[from] DbErr),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateUsername | AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            AppError::ImageDecode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a unique-constraint failure on `users` to the matching duplicate
    /// error; anything else stays a persistence error.
    pub fn from_user_insert(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("email") => {
                AppError::DuplicateEmail
            },
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateUsername,
            _ => AppError::Persistence(err),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let message = match &self {
            // Storage details stay in the log.
            AppError::Persistence(_) | AppError::Internal(_) => {
                "Something went wrong, please try again.".to_string()
            },
            other => other.to_string(),
        };
        (status, Html(crate::templates::error_page(message))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AccessDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Persistence(DbErr::Custom("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_constraint_errors_stay_persistence() {
        let err = AppError::from_user_insert(DbErr::Custom("disk full".into()));
        assert!(matches!(err, AppError::Persistence(_)));
    }
}
