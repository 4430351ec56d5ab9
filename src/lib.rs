pub mod config;
pub mod domains;
pub mod error;
pub mod kernel;
pub mod logging;
pub mod server;
pub mod services;

// Re-export the pieces front ends wire together
pub use config::Config;
pub use kernel::pipeline::{Assistant, CommandOutcome};
