pub mod auth;
pub mod capability;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod store;
pub mod studio;

#[cfg(test)]
mod testing;

pub use auth::{ApiKeySlot, AuthErrorMatcher, AuthState, EnvKeyHost, SubstringMatcher};
pub use capability::{AuthorizationHost, ImageCapability};
pub use config::StudioConfig;
pub use error::{Result, StudioError};
pub use gemini::{studio_from_config, ImageClient};
pub use models::*;
pub use orchestrator::Orchestrator;
pub use store::ResultStore;
pub use studio::Studio;
