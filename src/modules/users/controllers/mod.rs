pub mod key_controller;

pub use key_controller::configure;
