use actix_web::{get, put, web::Data, HttpRequest, HttpResponse};

use crate::{
    app::{AppError, AppState},
    auth::Identity,
    database::models::profile::ProfileChanges,
    profiles,
};

/// Pipe for a user's profile along with their published blogs
/// - url: `{domain}/profiles/{user_id}`
///
/// # Response
/// ## Ok
/// ```
/// {
///     "user_id": "e60a0f7b-381c-46b7-8736-1f204b329727",
///     "username": "alice",
///     "bio": null,
///     "avatar_url": null,
///     "blogs": [ ... ]
/// }
/// ```
/// ## Error
/// - Not found
#[get("/profiles/{user_id}")]
pub async fn get_profile(req: HttpRequest, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let user_id = req.match_info().query("user_id").to_string();
    let page = profiles::load_profile_page(&app_state.store, user_id).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Pipe for editing your own profile
/// - url: `{domain}/profiles/{user_id}`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
/// ## body
/// - json with optional `username` and `bio` keys, absent keys stay untouched
///
/// # Example
/// ```
/// let cookie = CookieBuilder::new("token", "test_token").finish();
/// let request = actix_web::test::TestRequest::put()
///     .uri("localhost/profiles/user_id")
///     .set_payload(r#"{"bio":"Writes about the sea"}"#)
///     .cookie(cookie)
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - the stored profile
/// ## Error
/// - Bad request
/// - Unauthorized
/// - Forbidden
#[put("/profiles/{user_id}")]
pub async fn edit_profile(
    req: HttpRequest,
    identity: Identity,
    req_body: String,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = req.match_info().query("user_id").to_string();
    let changes = serde_json::from_str::<ProfileChanges>(&req_body)?;
    let profile = profiles::update_profile(&app_state.store, &identity, user_id, &changes).await?;

    Ok(HttpResponse::Ok().json(profile))
}
