pub mod movie;
pub mod postgres_repository;
pub mod user;
