//! Unified CLI and HTTP servers for editing the WoW 3.3.5a client databases

pub mod cli;
pub mod commands;
pub mod config;
pub mod server;
