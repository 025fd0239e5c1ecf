// src/lib.rs

pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod wire;

pub use config::{Config, ConfigError};
pub use error::{ErrorResponse, ModelError, ModelResult};
pub use registry::ProviderRegistry;
