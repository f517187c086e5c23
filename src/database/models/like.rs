use std::collections::HashMap;
use diesel::{PgConnection, prelude::*};
use serde::{Serialize, Deserialize};
use crate::schema::likes;

#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize)]
pub struct Like{
    pub id: i32,
    pub blog_id: i32,
    pub user_id: String
}

#[derive(Insertable)]
#[table_name="likes"]
struct LikeInsert<'a>{
    pub blog_id: i32,
    pub user_id: &'a str
}

/// State of the like button after a toggle, as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64
}

impl Like{
    /** Inserts the like unless the pair already exists. Returns the number of inserted rows */
    pub fn insert(conn: &PgConnection, blog: i32, user: &str) -> QueryResult<usize> {
        diesel::insert_into(likes::table)
            .values(&LikeInsert { blog_id: blog, user_id: user })
            .on_conflict_do_nothing()
            .execute(conn)
    }

    /** Removes the like of the user on the blog. Returns the number of removed rows */
    pub fn delete(conn: &PgConnection, blog: i32, user: &str) -> QueryResult<usize> {
        use crate::schema::likes::dsl::*;
        diesel::delete(likes.filter(blog_id.eq(blog)).filter(user_id.eq(user))).execute(conn)
    }

    pub fn exists(conn: &PgConnection, blog: i32, user: &str) -> QueryResult<bool> {
        use crate::schema::likes::dsl::*;
        let found = likes.filter(blog_id.eq(blog))
            .filter(user_id.eq(user))
            .count()
            .get_result::<i64>(conn)?;

        Ok(found > 0)
    }

    pub fn count_by_blog(conn: &PgConnection, blog: i32) -> QueryResult<i64> {
        use crate::schema::likes::dsl::*;
        likes.filter(blog_id.eq(blog)).count().get_result(conn)
    }

    /** Counts likes for each of the blogs; blogs without likes are absent from the map */
    pub fn count_by_blogs(conn: &PgConnection, blog_ids: &[i32]) -> QueryResult<HashMap<i32, i64>> {
        use crate::schema::likes::dsl::*;
        let counts = likes.filter(blog_id.eq_any(blog_ids.to_vec()))
            .group_by(blog_id)
            .select((blog_id, diesel::dsl::sql::<diesel::sql_types::BigInt>("COUNT(*)")))
            .load::<(i32, i64)>(conn)?;

        Ok(counts.into_iter().collect())
    }
}
