pub mod token;

use actix_web::{dev::Payload, http::header::Header, web::Data, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use sha256::digest;

use crate::app::{AppError, AppState};

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// The signed-in principal performing a request.
///
/// Extracting `Identity` rejects anonymous requests with `401`; extract
/// [MaybeIdentity] where signing in is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// Finds the session token in the `token` cookie, falling back to a bearer header
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    Authorization::<Bearer>::parse(req)
        .ok()
        .map(|auth| auth.into_scheme().token().to_string())
}

/// SHA256 hex digest stored in place of the password
pub fn hash_password(password: &str) -> String {
    digest(password.to_string())
}

/// The signed-in principal if there is one.
///
/// A missing, unknown or expired token reads as anonymous. Unlike
/// `Option<Identity>`, a failing session store fails the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeIdentity(pub Option<Identity>);

impl MaybeIdentity {
    pub fn id(self) -> Option<String> {
        self.0.map(|identity| identity.id)
    }
}

fn resolve_identity(req: &HttpRequest) -> LocalBoxFuture<'static, Result<Option<Identity>, AppError>> {
    let token = session_token(req);
    let app_state = req.app_data::<Data<AppState>>().cloned();

    Box::pin(async move {
        let session = match token {
            Some(session) => session,
            None => return Ok(None),
        };
        let app_state = app_state.ok_or(AppError::InternalServerError)?;

        token::run(&app_state.tokens, move |t| t.resolve(&session)).await
    })
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let lookup = resolve_identity(req);
        Box::pin(async move { lookup.await?.ok_or(AppError::UnauthorizedError) })
    }
}

impl FromRequest for MaybeIdentity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let lookup = resolve_identity(req);
        Box::pin(async move { Ok(MaybeIdentity(lookup.await?)) })
    }
}
