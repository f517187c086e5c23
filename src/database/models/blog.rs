use chrono::NaiveDateTime;
use diesel::{PgConnection, prelude::*};
use serde::{Serialize, Deserialize};
use crate::schema::blogs;

#[derive(Debug, PartialEq, Eq)]
#[derive(Queryable)]
#[derive(Clone)]
#[derive(Serialize, Deserialize)]
pub struct Blog {
    pub id: i32,
    pub user_id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub published: bool,
    pub created_at: NaiveDateTime
}

#[derive(Insertable)]
#[table_name="blogs"]
pub struct NewBlog<'a> {
    pub user_id: &'a str,
    pub title: &'a str,
    pub excerpt: &'a str,
    pub content: &'a str,
    pub cover_image: Option<&'a str>,
    pub published: bool,
    pub created_at: NaiveDateTime
}

/// Every field the owner writes when saving a blog. A missing cover image
/// clears the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(AsChangeset)]
#[table_name="blogs"]
#[changeset_options(treat_none_as_null = "true")]
pub struct BlogFields {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub published: bool
}

impl Blog {
    /// Published blogs are visible to everyone, drafts only to their owner
    pub fn visible_to(&self, viewer: Option<&str>) -> bool {
        self.published || viewer == Some(self.user_id.as_str())
    }

    pub fn insert(conn: &PgConnection, owner: &str, fields: &BlogFields, created_at: NaiveDateTime) -> QueryResult<Blog> {
        let to_insert = NewBlog {
            user_id: owner,
            title: &fields.title,
            excerpt: &fields.excerpt,
            content: &fields.content,
            cover_image: fields.cover_image.as_deref(),
            published: fields.published,
            created_at
        };

        diesel::insert_into(blogs::table)
            .values(&to_insert)
            .get_result(conn)
    }

    pub fn get_by_id(conn: &PgConnection, blog_id: i32) -> QueryResult<Blog> {
        blogs::table.find(blog_id).first(conn)
    }

    /** Same as [Blog::get_by_id] but holds a row lock until the surrounding transaction ends */
    pub fn lock_by_id(conn: &PgConnection, blog_id: i32) -> QueryResult<Blog> {
        blogs::table.find(blog_id).for_update().first(conn)
    }

    /** Returns the latest published blogs, newest first */
    pub fn get_published(conn: &PgConnection, limit: i64) -> QueryResult<Vec<Blog>> {
        use crate::schema::blogs::dsl::*;

        blogs.filter(published.eq(true))
            .order((created_at.desc(), id.desc()))
            .limit(limit)
            .load::<Blog>(conn)
    }

    /** Returns every published blog written by the user, newest first */
    pub fn get_published_by_creator(conn: &PgConnection, creator: &str) -> QueryResult<Vec<Blog>> {
        use crate::schema::blogs::dsl::*;

        blogs.filter(user_id.eq(creator))
            .filter(published.eq(true))
            .order((created_at.desc(), id.desc()))
            .load::<Blog>(conn)
    }

    pub fn update(conn: &PgConnection, blog_id: i32, fields: &BlogFields) -> QueryResult<Blog> {
        diesel::update(blogs::table.find(blog_id))
            .set(fields)
            .get_result(conn)
    }

    /** Deletes the blog together with its comments and likes */
    pub fn delete_by_id(conn: &PgConnection, blog_id_in: i32) -> QueryResult<usize> {
        use crate::schema::{comments, likes};

        diesel::delete(likes::table.filter(likes::blog_id.eq(blog_id_in))).execute(conn)?;
        diesel::delete(comments::table.filter(comments::blog_id.eq(blog_id_in))).execute(conn)?;
        diesel::delete(blogs::table.find(blog_id_in)).execute(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn blog(published: bool) -> Blog {
        Blog {
            id: 1,
            user_id: "owner".to_string(),
            title: "Blog".to_string(),
            excerpt: String::new(),
            content: String::new(),
            cover_image: None,
            published,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
        }
    }

    #[test]
    fn test_draft_visible_to_owner_only() {
        let draft = blog(false);
        assert!(draft.visible_to(Some("owner")));
        assert!(!draft.visible_to(Some("stranger")));
        assert!(!draft.visible_to(None));

        let public = blog(true);
        assert!(public.visible_to(None));
        assert!(public.visible_to(Some("stranger")));
    }
}
