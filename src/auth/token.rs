use std::{collections::HashMap, sync::Arc, time::{Duration, Instant}};
use actix_web::web;
use parking_lot::Mutex;
use r2d2_redis::redis::Commands;
use rand::distributions::{Alphanumeric, DistString};

use crate::{app::AppError, database::db_utils::RedisPool};
use super::Identity;

/// Issues and resolves session tokens
pub trait TokenStore: Send + Sync {
    /// Starts a session for the identity and returns its token
    fn issue(&self, identity: &Identity) -> Result<String, AppError>;
    /// Returns the identity behind a live token
    fn resolve(&self, token: &str) -> Result<Option<Identity>, AppError>;
    fn revoke(&self, token: &str) -> Result<(), AppError>;
    /// Extends the lifetime of a live token, returns false if it already expired
    fn refresh(&self, token: &str) -> Result<bool, AppError>;
}

/// Runs a session store call on the blocking thread pool
pub async fn run<T, F>(tokens: &Arc<dyn TokenStore>, call: F) -> Result<T, AppError>
where
    F: FnOnce(&dyn TokenStore) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let tokens = tokens.clone();
    web::block(move || call(tokens.as_ref())).await?
}

fn new_token() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), 32)
}

/// Sessions kept in redis as `token -> identity json` with an expiry
pub struct RedisTokens {
    pool: RedisPool,
    ttl_secs: usize,
}

impl RedisTokens {
    pub fn new(pool: RedisPool, ttl_secs: u64) -> Self {
        Self { pool, ttl_secs: ttl_secs as usize }
    }
}

impl TokenStore for RedisTokens {
    fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        let mut conn = self.pool.get()?;
        let token = new_token();
        conn.set_ex::<&str, String, ()>(&token, serde_json::to_string(identity)?, self.ttl_secs)?;

        Ok(token)
    }

    fn resolve(&self, token: &str) -> Result<Option<Identity>, AppError> {
        let mut conn = self.pool.get()?;
        match conn.get::<&str, Option<String>>(token)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn revoke(&self, token: &str) -> Result<(), AppError> {
        let mut conn = self.pool.get()?;
        conn.del::<&str, ()>(token)?;
        Ok(())
    }

    fn refresh(&self, token: &str) -> Result<bool, AppError> {
        let mut conn = self.pool.get()?;
        Ok(conn.expire::<&str, i32>(token, self.ttl_secs)? == 1)
    }
}

/// Sessions kept in process memory
pub struct MemoryTokens {
    sessions: Mutex<HashMap<String, (Identity, Instant)>>,
    ttl: Duration,
}

impl MemoryTokens {
    pub fn new(ttl_secs: u64) -> Self {
        Self { sessions: Mutex::new(HashMap::new()), ttl: Duration::from_secs(ttl_secs) }
    }
}

impl TokenStore for MemoryTokens {
    fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        let token = new_token();
        self.sessions.lock().insert(token.clone(), (identity.clone(), Instant::now() + self.ttl));
        Ok(token)
    }

    fn resolve(&self, token: &str) -> Result<Option<Identity>, AppError> {
        let mut sessions = self.sessions.lock();
        let now = Instant::now();
        sessions.retain(|_, (_, expires)| *expires > now);

        Ok(sessions.get(token).map(|(identity, _)| identity.clone()))
    }

    fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.sessions.lock().remove(token);
        Ok(())
    }

    fn refresh(&self, token: &str) -> Result<bool, AppError> {
        let mut sessions = self.sessions.lock();
        match sessions.get_mut(token) {
            Some((_, expires)) if *expires > Instant::now() => {
                *expires = Instant::now() + self.ttl;
                Ok(true)
            },
            _ => Ok(false),
        }
    }
}
