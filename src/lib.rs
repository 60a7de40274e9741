pub mod configuration;
pub mod connection_tracking;
pub mod controller;
pub mod error_handling;
pub mod system_tools;

pub use configuration::config::{CommandLine, Config};
pub use controller::Controller;
