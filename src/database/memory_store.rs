use std::{cmp::Reverse, collections::HashMap, sync::atomic::{AtomicUsize, Ordering}};
use chrono::{Duration, NaiveDateTime, Utc};
use parking_lot::Mutex;

use crate::app::AppError;
use super::{
    models::{blog::*, comment::*, like::*, profile::*, user::*},
    store::Store,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<Profile>,
    blogs: Vec<Blog>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    next_id: i32,
    last_time: Option<NaiveDateTime>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Strictly increasing timestamps so that "newest first" is well defined
    fn now(&mut self) -> NaiveDateTime {
        let mut now = Utc::now().naive_utc();
        if let Some(last) = self.last_time {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_time = Some(now);
        now
    }

    fn blog(&self, blog_id: i32) -> Result<&Blog, AppError> {
        self.blogs.iter().find(|b| b.id == blog_id).ok_or(AppError::NotFound)
    }

    /// Drafts of other users read as absent
    fn visible_blog(&self, blog_id: i32, viewer: &str) -> Result<&Blog, AppError> {
        let blog = self.blog(blog_id)?;
        if !blog.visible_to(Some(viewer)) {
            return Err(AppError::NotFound);
        }
        Ok(blog)
    }

    fn owned_blog_index(&self, blog_id: i32, actor: &str) -> Result<usize, AppError> {
        let index = self.blogs.iter().position(|b| b.id == blog_id).ok_or(AppError::NotFound)?;
        if self.blogs[index].user_id != actor {
            return Err(AppError::Forbidden);
        }
        Ok(index)
    }

    fn like_count(&self, blog_id: i32) -> i64 {
        self.likes.iter().filter(|l| l.blog_id == blog_id).count() as i64
    }
}

/// Creation time descending, ties broken by the higher id
fn newest_first(mut blogs: Vec<Blog>) -> Vec<Blog> {
    blogs.sort_by_key(|b| Reverse((b.created_at, b.id)));
    blogs
}

fn tally<I: Iterator<Item = i32>>(ids: I) -> HashMap<i32, i64> {
    let mut counts = HashMap::new();
    for id in ids {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

/// [Store] keeping every table in process memory.
///
/// Every trait call counts as one request, see [MemoryStore::requests].
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    requests: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls served so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn request(&self) -> parking_lot::MutexGuard<'_, Tables> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.tables.lock()
    }
}

impl Store for MemoryStore {
    fn fetch_blog(&self, blog_id: i32) -> Result<Blog, AppError> {
        self.request().blog(blog_id).map(Clone::clone)
    }

    fn fetch_published_blogs(&self, limit: i64) -> Result<Vec<Blog>, AppError> {
        let tables = self.request();
        let published = tables.blogs.iter().filter(|b| b.published).cloned().collect();
        let mut blogs = newest_first(published);
        blogs.truncate(limit.max(0) as usize);
        Ok(blogs)
    }

    fn fetch_blogs_by_author(&self, user_id: &str) -> Result<Vec<Blog>, AppError> {
        let tables = self.request();
        Ok(newest_first(tables.blogs.iter()
            .filter(|b| b.published && b.user_id == user_id)
            .cloned()
            .collect()))
    }

    fn fetch_comments(&self, blog_id: i32) -> Result<Vec<Comment>, AppError> {
        let tables = self.request();
        let mut comments: Vec<Comment> = tables.comments.iter()
            .filter(|c| c.blog_id == blog_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(comments)
    }

    fn fetch_like_count(&self, blog_id: i32) -> Result<i64, AppError> {
        Ok(self.request().like_count(blog_id))
    }

    fn fetch_is_liked(&self, blog_id: i32, user_id: &str) -> Result<bool, AppError> {
        Ok(self.request().likes.iter().any(|l| l.blog_id == blog_id && l.user_id == user_id))
    }

    fn create_blog(&self, owner: &str, fields: &BlogFields) -> Result<Blog, AppError> {
        let mut tables = self.request();
        let blog = Blog {
            id: tables.next_id(),
            user_id: owner.to_string(),
            title: fields.title.clone(),
            excerpt: fields.excerpt.clone(),
            content: fields.content.clone(),
            cover_image: fields.cover_image.clone(),
            published: fields.published,
            created_at: tables.now(),
        };
        tables.blogs.push(blog.clone());
        Ok(blog)
    }

    fn update_blog(&self, blog_id: i32, actor: &str, fields: &BlogFields) -> Result<Blog, AppError> {
        let mut tables = self.request();
        let index = tables.owned_blog_index(blog_id, actor)?;

        let blog = &mut tables.blogs[index];
        blog.title = fields.title.clone();
        blog.excerpt = fields.excerpt.clone();
        blog.content = fields.content.clone();
        blog.cover_image = fields.cover_image.clone();
        blog.published = fields.published;
        Ok(blog.clone())
    }

    fn delete_blog(&self, blog_id: i32, actor: &str) -> Result<(), AppError> {
        let mut tables = self.request();
        let index = tables.owned_blog_index(blog_id, actor)?;

        tables.blogs.remove(index);
        tables.comments.retain(|c| c.blog_id != blog_id);
        tables.likes.retain(|l| l.blog_id != blog_id);
        Ok(())
    }

    fn toggle_like(&self, blog_id: i32, user_id: &str) -> Result<LikeState, AppError> {
        let mut tables = self.request();
        tables.visible_blog(blog_id, user_id)?;

        let before = tables.likes.len();
        tables.likes.retain(|l| !(l.blog_id == blog_id && l.user_id == user_id));
        let liked = tables.likes.len() == before;
        if liked {
            let id = tables.next_id();
            tables.likes.push(Like { id, blog_id, user_id: user_id.to_string() });
        }

        Ok(LikeState { liked, like_count: tables.like_count(blog_id) })
    }

    fn post_comment(&self, blog_id: i32, user_id: &str, content: &str) -> Result<Comment, AppError> {
        let mut tables = self.request();
        tables.visible_blog(blog_id, user_id)?;

        let comment = Comment {
            id: tables.next_id(),
            blog_id,
            user_id: user_id.to_string(),
            content: content.to_string(),
            created_at: tables.now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    fn fetch_profile(&self, user_id: &str) -> Result<Profile, AppError> {
        self.request().profiles.iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    fn update_profile(&self, user_id: &str, actor: &str, changes: &ProfileChanges) -> Result<Profile, AppError> {
        let mut tables = self.request();
        if user_id != actor {
            return Err(AppError::Forbidden);
        }

        let profile = tables.profiles.iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or(AppError::NotFound)?;
        if let Some(username) = &changes.username {
            profile.username = username.clone();
        }
        if let Some(bio) = &changes.bio {
            profile.bio = Some(bio.clone());
        }
        Ok(profile.clone())
    }

    fn fetch_usernames(&self, user_ids: &[String]) -> Result<HashMap<String, String>, AppError> {
        let tables = self.request();
        Ok(tables.profiles.iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .map(|p| (p.user_id.clone(), p.username.clone()))
            .collect())
    }

    fn fetch_like_counts(&self, blog_ids: &[i32]) -> Result<HashMap<i32, i64>, AppError> {
        let tables = self.request();
        Ok(tally(tables.likes.iter()
            .filter(|l| blog_ids.contains(&l.blog_id))
            .map(|l| l.blog_id)))
    }

    fn fetch_comment_counts(&self, blog_ids: &[i32]) -> Result<HashMap<i32, i64>, AppError> {
        let tables = self.request();
        Ok(tally(tables.comments.iter()
            .filter(|c| blog_ids.contains(&c.blog_id))
            .map(|c| c.blog_id)))
    }

    fn create_account(&self, user: &User, username: &str) -> Result<Profile, AppError> {
        let mut tables = self.request();
        if tables.users.iter().any(|u| u.email == user.email || u.id == user.id) {
            return Err(AppError::BadRequest("Already exists"));
        }

        let profile = Profile {
            user_id: user.id.clone(),
            username: username.to_string(),
            bio: None,
            avatar_url: None,
        };
        tables.users.push(user.clone());
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    fn find_account_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.request().users.iter().find(|u| u.email == email).cloned())
    }
}
