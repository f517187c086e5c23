use actix_web::{
    delete, get, post, put,
    web::{Data, Query},
    HttpRequest, HttpResponse,
};
use serde::Deserialize;

use crate::{
    app::{AppError, AppState},
    auth::{Identity, MaybeIdentity},
    blogs::{self, aggregate::assemble_detail, draft::BlogDraft},
};

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

fn blog_id(req: &HttpRequest) -> Result<i32, AppError> {
    Ok(req.match_info().query("blog_id").parse::<i32>()?)
}

/// Pipe for the home list: the latest published blogs with their author and counts
/// - url: `{domain}/blogs?q={search}`
///
/// # HTTP request requirements
/// - `q` (optional) - case-insensitive text looked up in titles and excerpts
///
/// # Response
/// ## Ok
/// ```
/// [
///     {
///         "id": 7,
///         "user_id": "e60a0f7b-381c-46b7-8736-1f204b329727",
///         "title": "Ocean Views",
///         "excerpt": "A trip",
///         "content": "...",
///         "cover_image": null,
///         "published": true,
///         "created_at": "2024-05-01T09:22:30.664361",
///         "author_name": "alice",
///         "like_count": 2,
///         "comment_count": 1
///     }
/// ]
/// ```
/// ## Error
/// - Internal server error
#[get("/blogs")]
pub async fn list_blogs(
    params: Query<SearchParams>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let cards = blogs::load_home(&app_state.store, app_state.config.list_limit, &params.q).await?;

    Ok(HttpResponse::Ok().json(cards))
}

/// Pipe for reading a blog with its comments and likes.
/// Drafts are only shown to their author.
/// - url: `{domain}/blogs/{blog_id}`
///
/// # HTTP request requirements
/// ## header (optional)
/// - cookie `token`, needed for `liked` to reflect the viewer
///
/// # Response
/// ## Ok
/// - the blog card fields plus `liked` and `comments`, each comment carrying `author_name`
/// ## Error
/// - Not found
/// - Bad request
/// - Internal server error
#[get("/blogs/{blog_id}")]
pub async fn get_blog(
    req: HttpRequest,
    viewer: MaybeIdentity,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = blog_id(&req)?;
    let detail = assemble_detail(&app_state.store, blog_id, viewer.id()).await?;

    Ok(HttpResponse::Ok().json(detail))
}

/// Pipe for creating a new blog, as draft or published
/// - url: `{domain}/blogs`
///
/// # HTTP request requirements
/// ## header
/// - cookie with name `token`, containing the login token
/// ## body
/// ```
/// {
///     "title": "Blog title",
///     "content": "Blog body",
///     "excerpt": "Optional teaser, defaults to the first 150 characters of content",
///     "cover_image": "https://example.com/optional.jpg",
///     "published": true
/// }
/// ```
///
/// # Response
/// ## Created
/// - the stored blog
/// ## Error
/// - Bad request
/// - Unauthorized
#[post("/blogs")]
pub async fn create_blog(
    identity: Identity,
    req_body: String,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let draft = serde_json::from_str::<BlogDraft>(&req_body)?;
    let blog = blogs::save_blog(&app_state.store, &identity, None, &draft).await?;

    Ok(HttpResponse::Created().json(blog))
}

/// Pipe for editing a blog, same body as creation. Only the author may edit.
/// - url: `{domain}/blogs/{blog_id}`
///
/// # Response
/// ## Ok
/// - the stored blog
/// ## Error
/// - Bad request
/// - Unauthorized
/// - Forbidden
/// - Not found
#[put("/blogs/{blog_id}")]
pub async fn edit_blog(
    req: HttpRequest,
    identity: Identity,
    req_body: String,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = blog_id(&req)?;
    let draft = serde_json::from_str::<BlogDraft>(&req_body)?;
    let blog = blogs::save_blog(&app_state.store, &identity, Some(blog_id), &draft).await?;

    Ok(HttpResponse::Ok().json(blog))
}

/// Pipe for deleting a blog together with its comments and likes. Only the author may delete.
/// - url: `{domain}/blogs/{blog_id}`
///
/// # Response
/// ## Ok
/// ## Error
/// - Unauthorized
/// - Forbidden
/// - Not found
#[delete("/blogs/{blog_id}")]
pub async fn delete_blog(
    req: HttpRequest,
    identity: Identity,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = blog_id(&req)?;
    blogs::delete_blog(&app_state.store, &identity, blog_id).await?;

    Ok(HttpResponse::Ok().finish())
}

/// Pipe for liking or unliking a blog. If the blog isn't liked by the user it becomes liked,
/// otherwise the like is removed.
/// - url: `{domain}/blogs/{blog_id}/like`
///
/// # Response
/// ## Ok
/// - the state after the toggle, as stored
/// ```
/// { "liked": true, "like_count": 3 }
/// ```
/// ## Error
/// - Unauthorized
/// - Not found, also for drafts of other users
#[put("/blogs/{blog_id}/like")]
pub async fn like_blog(
    req: HttpRequest,
    identity: Identity,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = blog_id(&req)?;
    let state = blogs::toggle_like(&app_state.store, &identity, blog_id).await?;

    Ok(HttpResponse::Ok().json(state))
}
