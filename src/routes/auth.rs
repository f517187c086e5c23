use actix_web::{
    cookie::{time::Duration, Cookie},
    delete, get, post, put,
    web::Data,
    HttpRequest, HttpResponse,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    app::{AppError, AppState},
    auth::{hash_password, session_token, token, Identity, TOKEN_COOKIE},
    database::{models::user::User, store::run},
};

const MIN_PASSWORD_LEN: usize = 10;

#[derive(Deserialize)]
struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Serialize)]
struct Session {
    pub id: String,
    pub email: String,
    pub token: String,
}

fn session_cookie(token: String, ttl_secs: u64) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(ttl_secs as i64))
        .finish()
}

async fn start_session(app_state: &AppState, identity: Identity) -> Result<HttpResponse, AppError> {
    let issued = identity.clone();
    let token = token::run(&app_state.tokens, move |t| t.issue(&issued)).await?;
    let cookie = session_cookie(token.clone(), app_state.config.session_ttl_secs);

    Ok(HttpResponse::Ok().cookie(cookie).json(Session { id: identity.id, email: identity.email, token }))
}

/// Username used when none is given at sign up: the part of the email before `@`
fn default_username(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// Pipe for creating an account and signing in with it
/// - url: `{domain}/auth/signup`
///
/// # HTTP request requirements
/// ## body
/// - json containing `email` and `password` keys, `username` optional
/// - `password` must be at least 10 characters long
///
/// # Example
/// ```
/// let data = r#"{ "email": "alice@example.com", "password": "long password" }"#;
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/auth/signup")
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - set cookie header containing login token
/// ```
/// { "id": "e60a0f7b-381c-46b7-8736-1f204b329727", "email": "alice@example.com", "token": "..." }
/// ```
/// ## Error
/// - Bad request
#[post("/auth/signup")]
pub async fn sign_up(req_body: String, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let credentials = serde_json::from_str::<Credentials>(&req_body)?;
    let email = credentials.email.trim().to_lowercase();
    let password = credentials.password;

    if !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest("Password must be at least 10 characters"));
    }
    let username = credentials
        .username
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default_username(&email));

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        pass: hash_password(&password),
    };
    let identity = Identity { id: user.id.clone(), email: user.email.clone() };
    run(&app_state.store, move |s| s.create_account(&user, &username)).await?;
    info!("account {} created", identity.id);

    start_session(&app_state, identity).await
}

/// Pipe for logging in
/// - url: `{domain}/auth/signin`
///
/// # HTTP request requirements
/// ## body
/// - json containing `email` and `password` keys
///
/// # Response
/// ## Ok
/// - set cookie header containing login token, same body as sign up
/// ## Error
/// - Bad request
/// - Unauthorized
#[post("/auth/signin")]
pub async fn sign_in(req_body: String, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let credentials = serde_json::from_str::<Credentials>(&req_body)?;
    let email = credentials.email.trim().to_lowercase();

    let user = run(&app_state.store, move |s| s.find_account_by_email(&email))
        .await?
        .ok_or(AppError::UnauthorizedError)?;
    if user.pass != hash_password(&credentials.password) {
        return Err(AppError::UnauthorizedError);
    }

    start_session(&app_state, Identity { id: user.id, email: user.email }).await
}

/// Pipe for reading the signed-in identity
/// - url: `{domain}/auth/me`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
///
/// # Response
/// ## Ok
/// ```
/// { "id": "e60a0f7b-381c-46b7-8736-1f204b329727", "email": "alice@example.com" }
/// ```
/// ## Error
/// - Unauthorized
#[get("/auth/me")]
pub async fn me(identity: Identity) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(identity))
}

/// Pipe for refreshing a token for a server specified duration
/// - url: `{domain}/auth/refresh`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
///
/// # Example
/// ```
/// let cookie = CookieBuilder::new("token", "test_token").finish();
/// let request = actix_web::test::TestRequest::put()
///     .uri("localhost/auth/refresh")
///     .cookie(cookie)
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - set cookie header containing refreshed login cookie
/// ## Error
/// - Unauthorized
#[put("/auth/refresh")]
pub async fn refresh(req: HttpRequest, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let token = session_token(&req).ok_or(AppError::UnauthorizedError)?;

    let session = token.clone();
    if !token::run(&app_state.tokens, move |t| t.refresh(&session)).await? {
        return Err(AppError::UnauthorizedError);
    }

    Ok(HttpResponse::Ok().cookie(session_cookie(token, app_state.config.session_ttl_secs)).finish())
}

/// Pipe for signing out: the token is removed from the session store and the cookie cleared
/// - url: `{domain}/auth/signout`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
///
/// # Response
/// ## Ok
/// ## Error
/// - Unauthorized
#[delete("/auth/signout")]
pub async fn sign_out(req: HttpRequest, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let token = session_token(&req).ok_or(AppError::UnauthorizedError)?;
    token::run(&app_state.tokens, move |t| t.revoke(&token)).await?;

    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();
    let mut response = HttpResponse::Ok().finish();
    response
        .add_removal_cookie(&cookie)
        .map_err(|_| AppError::InternalServerError)?;

    Ok(response)
}
