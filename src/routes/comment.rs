use actix_web::{get, post, web::Data, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::{
    app::{AppError, AppState},
    auth::{Identity, MaybeIdentity},
    blogs,
};

#[derive(Deserialize)]
pub struct NewComment {
    pub content: String,
}

/// Pipe for creating a comment
/// - url: `{domain}/blogs/{blog_id}/comments`
///
/// # HTTP request requires
/// - `{blog_id}` as a parameter
///
/// ## header
/// - cookie named `token` containing login token
///
/// ## body
/// ```
/// { "content": "comment text" }
/// ```
///
/// # Example
/// ```
/// let cookie = CookieBuilder::new("token", "test_token").finish();
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/blogs/blog_id/comments")
///     .set_payload(r#"{"content":"comment text"}"#)
///     .cookie(cookie)
///     .to_request();
/// ```
///
/// # Response
/// ## Created
/// - the stored comment with its `author_name`
/// ## Error
/// - Unauthorized
/// - Bad request
/// - Not found, also for drafts of other users
#[post("/blogs/{blog_id}/comments")]
pub async fn create_comment(
    req: HttpRequest,
    identity: Identity,
    req_body: String,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = req.match_info().query("blog_id").parse::<i32>()?;
    let new_comment = serde_json::from_str::<NewComment>(&req_body)?;

    let view = blogs::post_comment(&app_state.store, &identity, blog_id, &new_comment.content).await?;

    Ok(HttpResponse::Created().json(view))
}

/// Pipe for getting comments from blog, newest first
/// - url: `{domain}/blogs/{blog_id}/comments`
///
/// # HTTP request requirements
/// - `{blog_id}` as url parameter
/// ## header (optional)
/// - cookie `token`, needed to read the comments of your own drafts
///
/// # Response
/// ## Ok
/// ```
/// [
///     {
///         "id": 12,
///         "blog_id": 73,
///         "user_id": "e60a0f7b-381c-46b7-8736-1f204b329727",
///         "content": "Comment body 1",
///         "created_at": "2024-05-01T06:05:31.097180",
///         "author_name": "alice"
///     }
/// ]
/// ```
/// ## Error
/// - Bad request
/// - Not found
/// - Internal server error
#[get("/blogs/{blog_id}/comments")]
pub async fn get_comments(
    req: HttpRequest,
    viewer: MaybeIdentity,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = req.match_info().query("blog_id").parse::<i32>()?;
    let comments = blogs::load_comments(&app_state.store, blog_id, viewer.id()).await?;

    Ok(HttpResponse::Ok().json(comments))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, call_service, read_body_json};
    use actix_web::{web::Data, App};
    use serde_json::{json, Value};

    use crate::routes::{configure, testing::*};

    #[actix_rt::test]
    async fn test_new_and_get_comments() {
        let app_state = memory_state();
        let app = test::init_service(App::new().app_data(Data::new(app_state.clone())).configure(configure)).await;
        let author = signed_in(&app_state, "alice");
        let reader = signed_in(&app_state, "bob");

        let req = test::TestRequest::post()
            .uri("/blogs")
            .cookie(author)
            .set_payload(json!({ "title": "Talk", "content": "body", "published": true }).to_string())
            .to_request();
        let blog: Value = read_body_json(call_service(&app, req).await).await;
        let uri = format!("/blogs/{}/comments", blog["id"]);

        for text in ["first", "  second  "] {
            let req = test::TestRequest::post()
                .uri(&uri)
                .cookie(reader.clone())
                .set_payload(json!({ "content": text }).to_string())
                .to_request();
            let resp = call_service(&app, req).await;
            pretty_assertions::assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get().uri(&uri).to_request();
        let comments: Vec<Value> = read_body_json(call_service(&app, req).await).await;
        let bodies: Vec<&str> = comments.iter().map(|c| c["content"].as_str().unwrap()).collect();
        pretty_assertions::assert_eq!(bodies, vec!["second", "first"]);
        pretty_assertions::assert_eq!(comments[0]["author_name"], "bob");
    }

    #[actix_rt::test]
    async fn test_rejected_comments() {
        let app_state = memory_state();
        let app = test::init_service(App::new().app_data(Data::new(app_state.clone())).configure(configure)).await;
        let reader = signed_in(&app_state, "bob");

        let req = test::TestRequest::post()
            .uri("/blogs/1/comments")
            .set_payload(json!({ "content": "hi" }).to_string())
            .to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/blogs/1/comments")
            .cookie(reader.clone())
            .set_payload(json!({ "content": "   " }).to_string())
            .to_request();
        let resp = call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        pretty_assertions::assert_eq!(body["error"], "Comment cannot be empty");

        let req = test::TestRequest::post()
            .uri("/blogs/404/comments")
            .cookie(reader)
            .set_payload(json!({ "content": "hello?" }).to_string())
            .to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_draft_comments_hidden_from_strangers() {
        let app_state = memory_state();
        let app = test::init_service(App::new().app_data(Data::new(app_state.clone())).configure(configure)).await;
        let owner = signed_in(&app_state, "alice");
        let stranger = signed_in(&app_state, "mallory");

        let req = test::TestRequest::post()
            .uri("/blogs")
            .cookie(owner.clone())
            .set_payload(json!({ "title": "Secret", "content": "body", "published": false }).to_string())
            .to_request();
        let blog: Value = read_body_json(call_service(&app, req).await).await;
        let uri = format!("/blogs/{}/comments", blog["id"]);

        let req = test::TestRequest::post()
            .uri(&uri)
            .cookie(owner.clone())
            .set_payload(json!({ "content": "private note" }).to_string())
            .to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri(&uri).to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri(&uri).cookie(stranger.clone()).to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri(&uri)
            .cookie(stranger)
            .set_payload(json!({ "content": "let me in" }).to_string())
            .to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri(&uri).cookie(owner).to_request();
        let comments: Vec<Value> = read_body_json(call_service(&app, req).await).await;
        pretty_assertions::assert_eq!(comments.len(), 1);
        pretty_assertions::assert_eq!(comments[0]["content"], "private note");
    }
}
