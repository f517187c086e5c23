//! Decorates blog and comment rows with their author names and counts.
//!
//! A list of K blogs costs one query for the blogs plus three batched
//! lookups (usernames, like counts, comment counts) issued concurrently,
//! independent of K.

use std::{collections::HashMap, sync::Arc};
use log::warn;
use serde::Serialize;

use crate::{
    app::AppError,
    database::{models::{blog::Blog, comment::Comment}, store::{run, Store}},
};

/// Shown when the author has no profile or the lookup failed
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A blog as shown on the home and profile lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogCard {
    #[serde(flatten)]
    pub blog: Blog,
    pub author_name: String,
    pub like_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
}

/// Everything the blog page shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogDetail {
    #[serde(flatten)]
    pub card: BlogCard,
    /// Whether the viewer likes the blog, `false` for anonymous viewers
    pub liked: bool,
    pub comments: Vec<CommentView>,
}

fn author_name(names: &HashMap<String, String>, user_id: &str) -> String {
    names.get(user_id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

fn unique<I: Iterator<Item = String>>(ids: I) -> Vec<String> {
    let mut ids: Vec<String> = ids.collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Pairs every blog with its aggregates, keeping the order of `blogs`
pub fn compose_cards(
    blogs: Vec<Blog>,
    names: &HashMap<String, String>,
    likes: &HashMap<i32, i64>,
    comments: &HashMap<i32, i64>,
) -> Vec<BlogCard> {
    blogs.into_iter()
        .map(|blog| BlogCard {
            author_name: author_name(names, &blog.user_id),
            like_count: likes.get(&blog.id).copied().unwrap_or(0),
            comment_count: comments.get(&blog.id).copied().unwrap_or(0),
            blog,
        })
        .collect()
}

/// Username lookup that never fails the enclosing view
async fn usernames(store: &Arc<dyn Store>, user_ids: Vec<String>) -> HashMap<String, String> {
    run(store, move |s| s.fetch_usernames(&user_ids))
        .await
        .unwrap_or_else(|err| {
            warn!("username lookup failed, falling back to '{}': {}", UNKNOWN_AUTHOR, err);
            HashMap::new()
        })
}

pub async fn assemble_cards(store: &Arc<dyn Store>, blogs: Vec<Blog>) -> Result<Vec<BlogCard>, AppError> {
    if blogs.is_empty() {
        return Ok(Vec::new());
    }

    let author_ids = unique(blogs.iter().map(|b| b.user_id.clone()));
    let blog_ids: Vec<i32> = blogs.iter().map(|b| b.id).collect();
    let like_ids = blog_ids.clone();

    let (names, likes, comments) = futures::join!(
        usernames(store, author_ids),
        run(store, move |s| s.fetch_like_counts(&like_ids)),
        run(store, move |s| s.fetch_comment_counts(&blog_ids)),
    );

    Ok(compose_cards(blogs, &names, &likes?, &comments?))
}

pub async fn assemble_comments(store: &Arc<dyn Store>, comments: Vec<Comment>) -> Vec<CommentView> {
    if comments.is_empty() {
        return Vec::new();
    }

    let names = usernames(store, unique(comments.iter().map(|c| c.user_id.clone()))).await;
    comments.into_iter()
        .map(|comment| CommentView { author_name: author_name(&names, &comment.user_id), comment })
        .collect()
}

/// Loads the blog page. Drafts are only visible to their owner.
pub async fn assemble_detail(
    store: &Arc<dyn Store>,
    blog_id: i32,
    viewer: Option<String>,
) -> Result<BlogDetail, AppError> {
    let liker = viewer.clone();
    let (blog, comments, like_count, liked) = futures::try_join!(
        run(store, move |s| s.fetch_blog(blog_id)),
        run(store, move |s| s.fetch_comments(blog_id)),
        run(store, move |s| s.fetch_like_count(blog_id)),
        async {
            match liker {
                Some(user_id) => run(store, move |s| s.fetch_is_liked(blog_id, &user_id)).await,
                None => Ok(false),
            }
        },
    )?;

    if !blog.visible_to(viewer.as_deref()) {
        return Err(AppError::NotFound);
    }

    let author_ids = unique(std::iter::once(blog.user_id.clone())
        .chain(comments.iter().map(|c| c.user_id.clone())));
    let names = usernames(store, author_ids).await;

    let comments: Vec<CommentView> = comments.into_iter()
        .map(|comment| CommentView { author_name: author_name(&names, &comment.user_id), comment })
        .collect();

    Ok(BlogDetail {
        card: BlogCard {
            author_name: author_name(&names, &blog.user_id),
            like_count,
            comment_count: comments.len() as i64,
            blog,
        },
        liked,
        comments,
    })
}
