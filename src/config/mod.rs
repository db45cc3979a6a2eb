//! Configuration module for the batch narrator.
//!
//! Provides CLI argument parsing and configuration management.

#[allow(clippy::module_inception)]
mod config;
mod voices;

pub use config::{AppConfig, ConcatBackend, Provider};
