//! Command-line front end for ludex.
//!
//! `main.rs` parses arguments, calls [`bootstrap`] and dispatches to the
//! [`handlers`]; everything here is also usable from tests.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, OfflineCatalog, bootstrap, bootstrap_with};
pub use commands::{Commands, FilterArgs, QueueCommand};
pub use error::CliError;
pub use parser::Cli;
