//! AskDB - ask an inventory database questions in plain language or
//! read-only SQL.
//!
//! The binary is a thin wrapper; everything it runs lives in these modules
//! so integration tests can drive it directly.

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod persistence;
pub mod query;
pub mod safety;
pub mod shell;
