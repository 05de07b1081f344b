//! Core configuration utilities shared by the agentdesk crates.

pub mod config;

pub use config::{load_environment, AppConfig};
