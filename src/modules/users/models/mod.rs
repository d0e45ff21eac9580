pub mod user;

pub use user::{key_digest, User};
