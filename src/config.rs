use std::env;
use std::path::PathBuf;

use crate::auth::DEFAULT_AUTH_ERROR_PATTERN;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENERATE_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// High-quality model used for generate and upscale calls.
    pub generate_model: String,
    /// Fast model used for the per-angle edit calls.
    pub edit_model: String,
    pub request_timeout_secs: u64,
    pub auth_error_pattern: String,
    pub output_dir: PathBuf,
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            generate_model: DEFAULT_GENERATE_MODEL.to_string(),
            edit_model: DEFAULT_EDIT_MODEL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth_error_pattern: DEFAULT_AUTH_ERROR_PATTERN.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let base_url = env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url);
        let generate_model = env::var("STUDIO_GENERATE_MODEL").unwrap_or(defaults.generate_model);
        let edit_model = env::var("STUDIO_EDIT_MODEL").unwrap_or(defaults.edit_model);
        let request_timeout_secs = env::var("STUDIO_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);
        let auth_error_pattern =
            env::var("STUDIO_AUTH_ERROR_PATTERN").unwrap_or(defaults.auth_error_pattern);
        let output_dir = env::var("STUDIO_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        StudioConfig {
            api_key,
            base_url,
            generate_model,
            edit_model,
            request_timeout_secs,
            auth_error_pattern,
            output_dir,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(
        mut self,
        generate_model: impl Into<String>,
        edit_model: impl Into<String>,
    ) -> Self {
        self.generate_model = generate_model.into();
        self.edit_model = edit_model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_auth_error_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.auth_error_pattern = pattern.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
