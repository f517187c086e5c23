use std::{collections::HashMap, sync::Arc};
use actix_web::web;

use crate::app::AppError;
use super::models::{blog::*, comment::*, like::*, profile::*, user::*};

/// Every query and mutation the application issues against its rows.
///
/// Implementations enforce ownership themselves: mutations on a blog or a
/// profile take the acting identity and fail with [AppError::Forbidden] when
/// it does not own the row, or [AppError::NotFound] when the row is absent.
/// Calls block, so async code goes through [run].
pub trait Store: Send + Sync {
    fn fetch_blog(&self, blog_id: i32) -> Result<Blog, AppError>;
    /// Published blogs only, newest first, at most `limit` of them
    fn fetch_published_blogs(&self, limit: i64) -> Result<Vec<Blog>, AppError>;
    /// Published blogs of one author, newest first
    fn fetch_blogs_by_author(&self, user_id: &str) -> Result<Vec<Blog>, AppError>;
    /// Newest first
    fn fetch_comments(&self, blog_id: i32) -> Result<Vec<Comment>, AppError>;
    fn fetch_like_count(&self, blog_id: i32) -> Result<i64, AppError>;
    fn fetch_is_liked(&self, blog_id: i32, user_id: &str) -> Result<bool, AppError>;

    fn create_blog(&self, owner: &str, fields: &BlogFields) -> Result<Blog, AppError>;
    fn update_blog(&self, blog_id: i32, actor: &str, fields: &BlogFields) -> Result<Blog, AppError>;
    /// Removes the blog with its comments and likes
    fn delete_blog(&self, blog_id: i32, actor: &str) -> Result<(), AppError>;

    /// Inserts the like if absent, removes it if present, as one atomic step.
    /// The returned state is the one the store holds after the toggle.
    /// Another user's draft fails with [AppError::NotFound].
    fn toggle_like(&self, blog_id: i32, user_id: &str) -> Result<LikeState, AppError>;
    /// Stores `content` as given; callers validate it first.
    /// Another user's draft fails with [AppError::NotFound].
    fn post_comment(&self, blog_id: i32, user_id: &str, content: &str) -> Result<Comment, AppError>;

    fn fetch_profile(&self, user_id: &str) -> Result<Profile, AppError>;
    fn update_profile(&self, user_id: &str, actor: &str, changes: &ProfileChanges) -> Result<Profile, AppError>;

    /// Batched lookups used to decorate lists; ids without rows are left out of the maps
    fn fetch_usernames(&self, user_ids: &[String]) -> Result<HashMap<String, String>, AppError>;
    fn fetch_like_counts(&self, blog_ids: &[i32]) -> Result<HashMap<i32, i64>, AppError>;
    fn fetch_comment_counts(&self, blog_ids: &[i32]) -> Result<HashMap<i32, i64>, AppError>;

    /// Registers the credentials and the matching profile together
    fn create_account(&self, user: &User, username: &str) -> Result<Profile, AppError>;
    fn find_account_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

/// Runs a store call on the blocking thread pool
pub async fn run<T, F>(store: &Arc<dyn Store>, query: F) -> Result<T, AppError>
where
    F: FnOnce(&dyn Store) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    web::block(move || query(store.as_ref())).await?
}
