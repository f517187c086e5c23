use diesel::{PgConnection, prelude::*};
use crate::schema::users;

/// Credentials row backing an identity
#[derive(Debug, Queryable, Insertable, Clone, PartialEq, Eq)]
#[table_name = "users"]
pub struct User {
    pub id: String,
    pub email: String,
    ///SHA256 of the password
    pub pass: String,
}

impl User {
    pub fn insert(conn: &PgConnection, user: &User) -> QueryResult<User> {
        diesel::insert_into(users::table)
            .values(user)
            .get_result(conn)
    }

    /// Returns the user registered with the email, if any
    pub fn find_by_email(conn: &PgConnection, mail: &str) -> QueryResult<Option<User>> {
        use crate::schema::users::dsl::*;

        users.filter(email.eq(mail)).first::<User>(conn).optional()
    }
}
