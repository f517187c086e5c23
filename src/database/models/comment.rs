use std::collections::HashMap;
use chrono::NaiveDateTime;
use diesel::{PgConnection, prelude::*};
use serde::{Serialize, Deserialize};
use crate::schema::comments;

#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub blog_id: i32,
    pub user_id: String,
    pub content: String,
    pub created_at: NaiveDateTime
}

#[derive(Insertable)]
#[table_name="comments"]
struct CommentInsert<'a> {
    pub blog_id: i32,
    pub user_id: &'a str,
    pub content: &'a str,
    pub created_at: NaiveDateTime
}

impl Comment {
    /** Creates a comment on the blog specified */
    pub fn new(conn: &PgConnection, blog_id_in: i32, user_id_in: &str, comment_body: &str, created_at: NaiveDateTime) -> QueryResult<Comment> {
        let record = CommentInsert {
            blog_id: blog_id_in,
            user_id: user_id_in,
            content: comment_body,
            created_at
        };
        diesel::insert_into(comments::table)
            .values(&record)
            .get_result(conn)
    }

    /** Returns all comments posted in a blog, newest first */
    pub fn find_by_blog(conn: &PgConnection, blog_id_in: i32) -> QueryResult<Vec<Comment>> {
        use crate::schema::comments::dsl::*;

        comments.filter(blog_id.eq(blog_id_in))
            .order((created_at.desc(), id.desc()))
            .load::<Comment>(conn)
    }

    /** Counts comments for each of the blogs; blogs without comments are absent from the map */
    pub fn count_by_blogs(conn: &PgConnection, blog_ids: &[i32]) -> QueryResult<HashMap<i32, i64>> {
        use crate::schema::comments::dsl::*;

        let counts = comments.filter(blog_id.eq_any(blog_ids.to_vec()))
            .group_by(blog_id)
            .select((blog_id, diesel::dsl::sql::<diesel::sql_types::BigInt>("COUNT(*)")))
            .load::<(i32, i64)>(conn)?;

        Ok(counts.into_iter().collect())
    }
}
