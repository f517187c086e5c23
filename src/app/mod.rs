pub mod config;

use std::{sync::Arc, fmt::Display, num::ParseIntError};
use actix_web::{ResponseError, HttpResponse, error::BlockingError};
use diesel::result::DatabaseErrorKind;
use log::error;
use r2d2_redis::redis::RedisError;
use serde_json::json;

use crate::{auth::token::TokenStore, database::store::Store};
use config::Config;

/** Shared handles every request handler works with: the row store, the session store and the loaded configuration */
pub struct AppState{
    pub store: Arc<dyn Store>,
    pub tokens: Arc<dyn TokenStore>,
    pub config: Arc<Config>
}

impl Clone for AppState{
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), tokens: self.tokens.clone(), config: self.config.clone() }
    }
}

/** Holds the errors we use during request processing */
#[derive(Debug, PartialEq, Eq)]
pub enum AppError{
    UnauthorizedError,
    InternalServerError,
    BadRequest(&'static str),
    Forbidden,
    NotFound
}

impl Display for AppError{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self{
            AppError::UnauthorizedError => f.write_str("Unauthorized"),
            AppError::InternalServerError => f.write_str("Internal server error"),
            AppError::BadRequest(reason) => f.write_str(reason),
            AppError::Forbidden => f.write_str("Forbidden"),
            AppError::NotFound => f.write_str("Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AppError::UnauthorizedError => actix_web::http::StatusCode::UNAUTHORIZED,
            AppError::InternalServerError => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => actix_web::http::StatusCode::BAD_REQUEST,
            AppError::Forbidden => actix_web::http::StatusCode::FORBIDDEN,
            AppError::NotFound => actix_web::http::StatusCode::NOT_FOUND
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => AppError::NotFound,
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => AppError::BadRequest("Already exists"),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => AppError::NotFound,
            diesel::result::Error::InvalidCString(_) => AppError::BadRequest("Invalid string"),
            diesel::result::Error::QueryBuilderError(_) => AppError::BadRequest("Invalid query"),
            err => {
                error!("database error: {}", err);
                AppError::InternalServerError
            },
        }
    }
}
impl From<diesel::r2d2::PoolError> for AppError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        error!("connection pool error: {}", err);
        AppError::InternalServerError
    }
}
impl From<RedisError> for AppError{
    fn from(err: RedisError) -> Self {
        error!("redis error: {}", err);
        AppError::InternalServerError
    }
}
impl From<BlockingError> for AppError {
    fn from(_: BlockingError) -> Self {
        error!("blocking task was cancelled");
        AppError::InternalServerError
    }
}
impl From<ParseIntError> for AppError {
    fn from(_: ParseIntError) -> Self {
        Self::BadRequest("Invalid id")
    }
}
impl From<serde_json::Error> for AppError{
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Io => AppError::InternalServerError,
            _ => AppError::BadRequest("Malformed json"),
        }
    }
}

impl std::error::Error for AppError{}
