use std::collections::HashMap;
use chrono::Utc;
use diesel::{Connection, PgConnection, r2d2::{ConnectionManager, PooledConnection}};

use crate::app::AppError;
use super::{
    db_utils::PgPool,
    models::{blog::*, comment::*, like::*, profile::*, user::*},
    store::Store,
};

/// [Store] backed by Postgres through diesel
pub struct PgStore {
    pool: PgPool
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>, AppError> {
        Ok(self.pool.get()?)
    }
}

/// Fails unless `actor` owns the blog
fn ensure_owner(blog: &Blog, actor: &str) -> Result<(), AppError> {
    if blog.user_id != actor {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Drafts of other users read as absent
fn ensure_visible(blog: &Blog, viewer: &str) -> Result<(), AppError> {
    if !blog.visible_to(Some(viewer)) {
        return Err(AppError::NotFound);
    }
    Ok(())
}

impl Store for PgStore {
    fn fetch_blog(&self, blog_id: i32) -> Result<Blog, AppError> {
        Ok(Blog::get_by_id(&*self.conn()?, blog_id)?)
    }

    fn fetch_published_blogs(&self, limit: i64) -> Result<Vec<Blog>, AppError> {
        Ok(Blog::get_published(&*self.conn()?, limit)?)
    }

    fn fetch_blogs_by_author(&self, user_id: &str) -> Result<Vec<Blog>, AppError> {
        Ok(Blog::get_published_by_creator(&*self.conn()?, user_id)?)
    }

    fn fetch_comments(&self, blog_id: i32) -> Result<Vec<Comment>, AppError> {
        Ok(Comment::find_by_blog(&*self.conn()?, blog_id)?)
    }

    fn fetch_like_count(&self, blog_id: i32) -> Result<i64, AppError> {
        Ok(Like::count_by_blog(&*self.conn()?, blog_id)?)
    }

    fn fetch_is_liked(&self, blog_id: i32, user_id: &str) -> Result<bool, AppError> {
        Ok(Like::exists(&*self.conn()?, blog_id, user_id)?)
    }

    fn create_blog(&self, owner: &str, fields: &BlogFields) -> Result<Blog, AppError> {
        Ok(Blog::insert(&*self.conn()?, owner, fields, Utc::now().naive_utc())?)
    }

    fn update_blog(&self, blog_id: i32, actor: &str, fields: &BlogFields) -> Result<Blog, AppError> {
        let conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|| {
            ensure_owner(&Blog::lock_by_id(&conn, blog_id)?, actor)?;
            Ok(Blog::update(&conn, blog_id, fields)?)
        })
    }

    fn delete_blog(&self, blog_id: i32, actor: &str) -> Result<(), AppError> {
        let conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|| {
            ensure_owner(&Blog::lock_by_id(&conn, blog_id)?, actor)?;
            Blog::delete_by_id(&conn, blog_id)?;
            Ok(())
        })
    }

    fn toggle_like(&self, blog_id: i32, user_id: &str) -> Result<LikeState, AppError> {
        let conn = self.conn()?;
        // The blog row lock serialises toggles on the same blog
        conn.transaction::<_, AppError, _>(|| {
            ensure_visible(&Blog::lock_by_id(&conn, blog_id)?, user_id)?;

            let liked = if Like::delete(&conn, blog_id, user_id)? > 0 {
                false
            } else {
                Like::insert(&conn, blog_id, user_id)?;
                true
            };

            Ok(LikeState { liked, like_count: Like::count_by_blog(&conn, blog_id)? })
        })
    }

    fn post_comment(&self, blog_id: i32, user_id: &str, content: &str) -> Result<Comment, AppError> {
        let conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|| {
            ensure_visible(&Blog::lock_by_id(&conn, blog_id)?, user_id)?;
            Ok(Comment::new(&conn, blog_id, user_id, content, Utc::now().naive_utc())?)
        })
    }

    fn fetch_profile(&self, user_id: &str) -> Result<Profile, AppError> {
        Ok(Profile::find_by_user(&*self.conn()?, user_id)?)
    }

    fn update_profile(&self, user_id: &str, actor: &str, changes: &ProfileChanges) -> Result<Profile, AppError> {
        if user_id != actor {
            return Err(AppError::Forbidden);
        }
        Ok(Profile::update(&*self.conn()?, user_id, changes)?)
    }

    fn fetch_usernames(&self, user_ids: &[String]) -> Result<HashMap<String, String>, AppError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(Profile::usernames(&*self.conn()?, user_ids)?)
    }

    fn fetch_like_counts(&self, blog_ids: &[i32]) -> Result<HashMap<i32, i64>, AppError> {
        if blog_ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(Like::count_by_blogs(&*self.conn()?, blog_ids)?)
    }

    fn fetch_comment_counts(&self, blog_ids: &[i32]) -> Result<HashMap<i32, i64>, AppError> {
        if blog_ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(Comment::count_by_blogs(&*self.conn()?, blog_ids)?)
    }

    fn create_account(&self, user: &User, username: &str) -> Result<Profile, AppError> {
        let conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|| {
            User::insert(&conn, user)?;
            Ok(Profile::new(&conn, &user.id, username)?)
        })
    }

    fn find_account_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(User::find_by_email(&*self.conn()?, email)?)
    }
}
