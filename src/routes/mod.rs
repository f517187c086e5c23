pub mod auth;
pub mod blog;
pub mod comment;
pub mod profile;

use actix_web::web::ServiceConfig;

/// Registers every route of the api
pub fn configure(cfg: &mut ServiceConfig) {
    cfg
        //Auth routes
        .service(auth::sign_up)
        .service(auth::sign_in)
        .service(auth::me)
        .service(auth::refresh)
        .service(auth::sign_out)
        //Blog routes
        .service(blog::list_blogs)
        .service(blog::create_blog)
        .service(blog::get_blog)
        .service(blog::edit_blog)
        .service(blog::delete_blog)
        .service(blog::like_blog)
        //Comment routes
        .service(comment::create_comment)
        .service(comment::get_comments)
        //Profile routes
        .service(profile::get_profile)
        .service(profile::edit_profile);
}

#[cfg(test)]
pub mod testing {
    use std::sync::Arc;
    use actix_web::cookie::Cookie;

    use crate::{
        app::{config::Config, AppError, AppState},
        auth::{token::{MemoryTokens, TokenStore}, Identity, TOKEN_COOKIE},
        database::{memory_store::MemoryStore, models::user::User},
    };

    pub fn memory_state() -> AppState {
        let config = Config::memory();
        AppState {
            store: Arc::new(MemoryStore::new()),
            tokens: Arc::new(MemoryTokens::new(config.session_ttl_secs)),
            config: Arc::new(config),
        }
    }

    /// Registers `name` as both user id and username, returning a signed-in cookie
    pub fn signed_in(app_state: &AppState, name: &str) -> Cookie<'static> {
        let user = User {
            id: name.to_string(),
            email: format!("{}@blogspace.test", name),
            pass: String::new(),
        };
        app_state.store.create_account(&user, name).unwrap();

        let identity = Identity { id: user.id, email: user.email };
        let token = app_state.tokens.issue(&identity).unwrap();
        Cookie::new(TOKEN_COOKIE, token)
    }

    /// Session store whose backend is unreachable
    pub struct DownTokens;

    impl TokenStore for DownTokens {
        fn issue(&self, _: &Identity) -> Result<String, AppError> {
            Err(AppError::InternalServerError)
        }
        fn resolve(&self, _: &str) -> Result<Option<Identity>, AppError> {
            Err(AppError::InternalServerError)
        }
        fn revoke(&self, _: &str) -> Result<(), AppError> {
            Err(AppError::InternalServerError)
        }
        fn refresh(&self, _: &str) -> Result<bool, AppError> {
            Err(AppError::InternalServerError)
        }
    }
}
