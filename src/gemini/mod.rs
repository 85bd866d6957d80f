pub mod image_client;

use crate::{
    auth::{ApiKeySlot, EnvKeyHost, SubstringMatcher},
    config::StudioConfig,
    error::Result,
    orchestrator::Orchestrator,
    studio::Studio,
};

pub use image_client::ImageClient;

/// Wires a studio to the Gemini image API using `config`. The host and the
/// client share one key slot, so a key selected later is used by the next call.
pub fn studio_from_config(config: &StudioConfig) -> Result<Studio<ImageClient, EnvKeyHost>> {
    let keys = ApiKeySlot::new(config.api_key.clone());
    let image_client = ImageClient::new(config)?.with_key_slot(keys.clone());
    let orchestrator = Orchestrator::new(image_client)
        .with_matcher(SubstringMatcher::new(config.auth_error_pattern.clone()));
    let host = EnvKeyHost::new(keys);

    log::info!(
        "✅ Gemini image client ready (generate: {}, edit: {})",
        config.generate_model,
        config.edit_model
    );
    Ok(Studio::new(orchestrator, host))
}
