//! Claims Dashboard CLI
//!
//! A terminal front end over the claims domain: an overview with totals,
//! claim search and detail, and attachment upload, download and delete.
//!
//! # Modules
//!
//! - `cli`: clap argument definitions
//! - `commands`: executes a command against any `ClaimsApiPort`
//! - `render`: plain-text tables and detail view
//! - `local`: download directory, terminal prompt, upload file reading
//! - `error`: CLI error type

pub mod cli;
pub mod commands;
pub mod error;
pub mod local;
pub mod render;

pub use cli::{Cli, Command};
pub use commands::Dashboard;
pub use error::CliError;
pub use local::{DirectorySink, TerminalConfirm};
