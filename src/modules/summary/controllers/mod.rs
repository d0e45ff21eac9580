pub mod summary_controller;

pub use summary_controller::configure;
