pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{key_digest, User};
pub use repositories::{MySqlUserRepository, UserRepository};
pub use services::KeyService;
