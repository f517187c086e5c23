pub mod db_utils;
pub mod memory_store;
pub mod models;
pub mod pg_store;
pub mod store;

#[cfg(test)]
mod contract;
