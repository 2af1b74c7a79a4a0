// Frameworks layer: environment config, tracing setup, and the console loop.

pub mod config;
pub mod console;
