pub mod auth;
pub mod comments;
pub mod reviews;
pub mod titles;
pub mod users;
pub mod vocabulary;
