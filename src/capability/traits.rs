use crate::{
    error::Result,
    models::{AspectRatio, ImagePayload, QualityTier},
};
use async_trait::async_trait;

/// The remote image model service. Failures are reported as
/// `StudioError::CapabilityError` carrying the service's own message.
#[async_trait]
pub trait ImageCapability: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        quality: QualityTier,
        aspect_ratio: AspectRatio,
    ) -> Result<ImagePayload>;

    async fn edit(
        &self,
        source_image: &ImagePayload,
        instruction: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImagePayload>;

    async fn upscale(
        &self,
        source_image: &ImagePayload,
        context_prompt: &str,
        quality: QualityTier,
    ) -> Result<ImagePayload>;

    /// Model id recorded on artifacts from `generate` and `upscale`.
    fn generate_model(&self) -> &str;

    /// Model id recorded on artifacts from `edit`.
    fn edit_model(&self) -> &str;
}

/// Key selection owned by the host environment.
#[async_trait]
pub trait AuthorizationHost: Send + Sync {
    async fn has_selected_key(&self) -> Result<bool>;

    async fn open_select_key(&self) -> Result<()>;

    /// Called when the service refused the selected key, before the next
    /// selection.
    async fn reject_key(&self) -> Result<()> {
        Ok(())
    }
}
