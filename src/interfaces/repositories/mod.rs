pub mod article;
pub mod image;
pub mod owner;
pub mod sqlx_repo;
pub mod user;
