pub mod aggregate;
pub mod draft;
pub mod search;

use std::sync::Arc;
use log::info;

use crate::{
    app::AppError,
    auth::Identity,
    database::{models::{blog::Blog, like::LikeState}, store::{run, Store}},
};
use aggregate::{assemble_cards, assemble_comments, BlogCard, CommentView};
use draft::BlogDraft;
use search::filter_cards;

/// Latest published blogs as cards, narrowed by the search query
pub async fn load_home(store: &Arc<dyn Store>, limit: i64, query: &str) -> Result<Vec<BlogCard>, AppError> {
    let blogs = run(store, move |s| s.fetch_published_blogs(limit)).await?;
    let cards = assemble_cards(store, blogs).await?;

    Ok(filter_cards(cards, query))
}

pub async fn load_author_cards(store: &Arc<dyn Store>, user_id: String) -> Result<Vec<BlogCard>, AppError> {
    let blogs = run(store, move |s| s.fetch_blogs_by_author(&user_id)).await?;
    assemble_cards(store, blogs).await
}

/// Creates a blog, or overwrites `blog_id` when given, on behalf of `identity`
pub async fn save_blog(
    store: &Arc<dyn Store>,
    identity: &Identity,
    blog_id: Option<i32>,
    draft: &BlogDraft,
) -> Result<Blog, AppError> {
    let fields = draft.validate()?;
    let actor = identity.id.clone();

    let blog = match blog_id {
        Some(id) => run(store, move |s| s.update_blog(id, &actor, &fields)).await?,
        None => run(store, move |s| s.create_blog(&actor, &fields)).await?,
    };
    info!("blog {} saved by {} (published: {})", blog.id, identity.id, blog.published);

    Ok(blog)
}

pub async fn delete_blog(store: &Arc<dyn Store>, identity: &Identity, blog_id: i32) -> Result<(), AppError> {
    let actor = identity.id.clone();
    run(store, move |s| s.delete_blog(blog_id, &actor)).await?;
    info!("blog {} deleted by {}", blog_id, identity.id);

    Ok(())
}

pub async fn toggle_like(store: &Arc<dyn Store>, identity: &Identity, blog_id: i32) -> Result<LikeState, AppError> {
    let user_id = identity.id.clone();
    run(store, move |s| s.toggle_like(blog_id, &user_id)).await
}

/// Comments of a blog the viewer may see, newest first
pub async fn load_comments(
    store: &Arc<dyn Store>,
    blog_id: i32,
    viewer: Option<String>,
) -> Result<Vec<CommentView>, AppError> {
    let (blog, comments) = futures::try_join!(
        run(store, move |s| s.fetch_blog(blog_id)),
        run(store, move |s| s.fetch_comments(blog_id)),
    )?;
    if !blog.visible_to(viewer.as_deref()) {
        return Err(AppError::NotFound);
    }

    Ok(assemble_comments(store, comments).await)
}

/// Stores a trimmed comment. Blank comments are rejected without touching the store.
pub async fn post_comment(
    store: &Arc<dyn Store>,
    identity: &Identity,
    blog_id: i32,
    content: &str,
) -> Result<CommentView, AppError> {
    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::BadRequest("Comment cannot be empty"));
    }

    let user_id = identity.id.clone();
    let comment = run(store, move |s| s.post_comment(blog_id, &user_id, &content)).await?;

    assemble_comments(store, vec![comment]).await
        .pop()
        .ok_or(AppError::InternalServerError)
}
