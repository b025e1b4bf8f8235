// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Console and TCP front ends for the blockfs engine.

pub mod client;
pub mod command;
pub mod config;
pub mod executor;
pub mod server;

pub use client::FsClient;
pub use command::{parse_line, Command, CommandError};
pub use config::{ConfigError, SrvConfig};
pub use executor::{Executor, Reply};
pub use server::FsServer;
