//! CLI module - argument parsing and the convert subcommand

mod args;
pub mod convert;

pub use args::{convert_output_path, Cli, Commands};
