pub mod key_service;

pub use key_service::KeyService;
