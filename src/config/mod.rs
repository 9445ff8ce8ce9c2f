//! Configuration module
//!
//! This module provides:
//! - Client options (`ClientOptions`) read from the environment or YAML
//! - YAML loading functionality (`load_config`)
//! - Protocol constants and env-overridable defaults

pub mod constants;
mod loader;
mod types;

pub use types::ClientOptions;

pub use loader::{load_config, load_config_from_str};
