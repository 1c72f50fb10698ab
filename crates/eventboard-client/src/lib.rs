//! CLI, configuration, fetch session, commands
//!
//! This crate provides the `eventboard` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod session;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use session::{Catalog, EventSession, FetchOutcome, OwnedPage, RetryPolicy};
