//! Command-line interface adapter

pub mod commands;

pub use commands::{CliApp, Command, LookupCmd, RunCmd, ScanCmd};
