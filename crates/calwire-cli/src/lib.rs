//! Command-line front end for calwire.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod tracing;
