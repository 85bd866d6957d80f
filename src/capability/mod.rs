pub mod traits;

use crate::{
    error::Result,
    models::{AspectRatio, ImagePayload, QualityTier},
};
use async_trait::async_trait;
use std::sync::Arc;

pub use traits::{AuthorizationHost, ImageCapability};

#[async_trait]
impl<T: ImageCapability + ?Sized> ImageCapability for Arc<T> {
    async fn generate(
        &self,
        prompt: &str,
        quality: QualityTier,
        aspect_ratio: AspectRatio,
    ) -> Result<ImagePayload> {
        (**self).generate(prompt, quality, aspect_ratio).await
    }

    async fn edit(
        &self,
        source_image: &ImagePayload,
        instruction: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImagePayload> {
        (**self).edit(source_image, instruction, aspect_ratio).await
    }

    async fn upscale(
        &self,
        source_image: &ImagePayload,
        context_prompt: &str,
        quality: QualityTier,
    ) -> Result<ImagePayload> {
        (**self).upscale(source_image, context_prompt, quality).await
    }

    fn generate_model(&self) -> &str {
        (**self).generate_model()
    }

    fn edit_model(&self) -> &str {
        (**self).edit_model()
    }
}

#[async_trait]
impl<T: AuthorizationHost + ?Sized> AuthorizationHost for Arc<T> {
    async fn has_selected_key(&self) -> Result<bool> {
        (**self).has_selected_key().await
    }

    async fn open_select_key(&self) -> Result<()> {
        (**self).open_select_key().await
    }

    async fn reject_key(&self) -> Result<()> {
        (**self).reject_key().await
    }
}
