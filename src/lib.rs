//! `localboost` library crate.
//!
//! The binary (`localboost`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or servers
//! - the HTTP handlers and the CLI share one analysis pipeline
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
pub mod server;
