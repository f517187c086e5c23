use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use r2d2_redis::RedisConnectionManager;

use crate::app::AppError;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type RedisPool = r2d2_redis::r2d2::Pool<RedisConnectionManager>;

/// Return a connection pool to the hosted database.
///
/// # Example
/// ```
/// let pool = psql_connect_to_db("postgres://localhost/blogspace")?;
/// ```
pub fn psql_connect_to_db(database_url: &str) -> Result<PgPool, AppError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(Pool::builder().build(manager)?)
}

/// Return a connection pool to the redis instance holding session tokens.
pub fn redis_connect_to_db(redis_url: &str) -> Result<RedisPool, AppError> {
    let manager = RedisConnectionManager::new(redis_url)?;
    Ok(r2d2_redis::r2d2::Pool::builder().build(manager)?)
}
