//! CLI command handlers, one file per command.

mod config;
mod get;
mod mode;

pub use config::run_config;
pub use get::{run_get, Forced};
pub use mode::run_mode;
