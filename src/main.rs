#[macro_use]
extern crate diesel;
extern crate dotenv;

pub mod schema;
pub mod database;
pub mod app;

mod auth;
mod blogs;
mod profiles;
mod routes;

use std::{io, sync::Arc};
use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use app::{config::{Backend, Config}, AppError, AppState};
use auth::token::{MemoryTokens, RedisTokens, TokenStore};
use database::{
    db_utils::{psql_connect_to_db, redis_connect_to_db},
    memory_store::MemoryStore,
    pg_store::PgStore,
    store::Store,
};

fn build_state(config: Config) -> Result<AppState, AppError> {
    let (store, tokens): (Arc<dyn Store>, Arc<dyn TokenStore>) = match config.backend {
        Backend::Postgres => {
            let database_url = config.database_url.as_deref().ok_or(AppError::InternalServerError)?;
            let redis_url = config.redis_url.as_deref().ok_or(AppError::InternalServerError)?;
            (
                Arc::new(PgStore::new(psql_connect_to_db(database_url)?)),
                Arc::new(RedisTokens::new(redis_connect_to_db(redis_url)?, config.session_ttl_secs)),
            )
        },
        Backend::Memory => (
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryTokens::new(config.session_ttl_secs)),
        ),
    };

    Ok(AppState { store, tokens, config: Arc::new(config) })
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|err| {
        error!("invalid configuration: {}", err);
        io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
    })?;
    let bind_addr = config.bind_addr.clone();
    let app_state = build_state(config)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;

    info!("Server running on {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(Data::new(app_state.clone()))
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
