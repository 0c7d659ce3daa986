pub mod error;
pub mod health;
pub mod movie;
pub mod pagination;
pub mod user;
