use std::collections::HashMap;
use diesel::{PgConnection, prelude::*};
use serde::{Serialize, Deserialize};
use crate::schema::profiles;

#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>
}

#[derive(Insertable)]
#[table_name="profiles"]
struct ProfileInsert<'a> {
    pub user_id: &'a str,
    pub username: &'a str
}

/// Partial profile update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[derive(AsChangeset)]
#[table_name="profiles"]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub bio: Option<String>
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.bio.is_none()
    }
}

impl Profile {
    pub fn new(conn: &PgConnection, user: &str, name: &str) -> QueryResult<Profile> {
        diesel::insert_into(profiles::table)
            .values(&ProfileInsert { user_id: user, username: name })
            .get_result(conn)
    }

    pub fn find_by_user(conn: &PgConnection, user: &str) -> QueryResult<Profile> {
        profiles::table.find(user).first(conn)
    }

    /** Looks up usernames for a set of identities. Identities without a profile are absent from the map */
    pub fn usernames(conn: &PgConnection, user_ids: &[String]) -> QueryResult<HashMap<String, String>> {
        use crate::schema::profiles::dsl::*;

        let rows = profiles.filter(user_id.eq_any(user_ids.to_vec()))
            .select((user_id, username))
            .load::<(String, String)>(conn)?;

        Ok(rows.into_iter().collect())
    }

    pub fn update(conn: &PgConnection, user: &str, changes: &ProfileChanges) -> QueryResult<Profile> {
        if changes.is_empty() {
            return Profile::find_by_user(conn, user);
        }
        diesel::update(profiles::table.find(user))
            .set(changes)
            .get_result(conn)
    }
}
