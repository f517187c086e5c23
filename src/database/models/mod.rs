pub mod blog;
pub mod comment;
pub mod like;
pub mod profile;
pub mod user;
