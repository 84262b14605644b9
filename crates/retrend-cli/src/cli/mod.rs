pub mod args;
pub mod chat;
pub mod commands;
pub mod config;
pub mod output;

pub use args::{Cli, Commands, LocationCommand, WishlistCommand};
pub use commands::run;
pub use config::CliConfig;
pub use output::Printer;
