//! Scripted doubles for the capability and host traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    auth::DEFAULT_AUTH_ERROR_PATTERN,
    capability::{AuthorizationHost, ImageCapability},
    error::{Result, StudioError},
    models::{AspectRatio, ImagePayload, QualityTier, ANGLES},
};

pub const AUTH_MESSAGE: &str = DEFAULT_AUTH_ERROR_PATTERN;

#[derive(Default)]
pub struct MockCapability {
    generate_failure: Option<String>,
    upscale_failure: Option<String>,
    angle_failures: HashMap<usize, String>,
    edit_delays_ms: Vec<u64>,
    generate_calls: AtomicUsize,
    edit_calls: AtomicUsize,
    upscale_calls: AtomicUsize,
    last_generate: Mutex<Option<(String, QualityTier, AspectRatio)>>,
    last_upscale: Mutex<Option<(String, QualityTier)>>,
    edit_prompts: Mutex<Vec<String>>,
}

impl MockCapability {
    pub const GENERATE_MODEL: &'static str = "mock-pro-image";
    pub const EDIT_MODEL: &'static str = "mock-flash-image";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_generate(mut self, message: impl Into<String>) -> Self {
        self.generate_failure = Some(message.into());
        self
    }

    pub fn fail_upscale(mut self, message: impl Into<String>) -> Self {
        self.upscale_failure = Some(message.into());
        self
    }

    /// Fails the edit whose prompt targets `ANGLES[index]`.
    pub fn fail_angle(mut self, index: usize, message: impl Into<String>) -> Self {
        self.angle_failures.insert(index, message.into());
        self
    }

    /// Per-angle response delay, indexed like `ANGLES`.
    pub fn with_edit_delays(mut self, delays_ms: Vec<u64>) -> Self {
        self.edit_delays_ms = delays_ms;
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn edit_calls(&self) -> usize {
        self.edit_calls.load(Ordering::SeqCst)
    }

    pub fn upscale_calls(&self) -> usize {
        self.upscale_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.generate_calls() + self.edit_calls() + self.upscale_calls()
    }

    pub fn last_generate(&self) -> Option<(String, QualityTier, AspectRatio)> {
        self.last_generate.lock().unwrap().clone()
    }

    pub fn last_upscale(&self) -> Option<(String, QualityTier)> {
        self.last_upscale.lock().unwrap().clone()
    }

    pub fn edit_prompts(&self) -> Vec<String> {
        self.edit_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageCapability for MockCapability {
    async fn generate(
        &self,
        prompt: &str,
        quality: QualityTier,
        aspect_ratio: AspectRatio,
    ) -> Result<ImagePayload> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_generate.lock().unwrap() = Some((prompt.to_string(), quality, aspect_ratio));
        match &self.generate_failure {
            Some(msg) => Err(StudioError::CapabilityError(msg.clone())),
            None => Ok(ImagePayload::new("Z2VuZXJhdGVk", "image/png")),
        }
    }

    async fn edit(
        &self,
        _source_image: &ImagePayload,
        instruction: &str,
        _aspect_ratio: AspectRatio,
    ) -> Result<ImagePayload> {
        self.edit_calls.fetch_add(1, Ordering::SeqCst);
        self.edit_prompts
            .lock()
            .unwrap()
            .push(instruction.to_string());

        let index = ANGLES
            .iter()
            .position(|angle| instruction.ends_with(angle.suffix))
            .expect("edit prompt names an angle");

        if let Some(ms) = self.edit_delays_ms.get(index) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }

        match self.angle_failures.get(&index) {
            Some(msg) => Err(StudioError::CapabilityError(msg.clone())),
            None => Ok(ImagePayload::new(format!("angle-{}", index), "image/png")),
        }
    }

    async fn upscale(
        &self,
        source_image: &ImagePayload,
        context_prompt: &str,
        quality: QualityTier,
    ) -> Result<ImagePayload> {
        self.upscale_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_upscale.lock().unwrap() = Some((context_prompt.to_string(), quality));
        match &self.upscale_failure {
            Some(msg) => Err(StudioError::CapabilityError(msg.clone())),
            None => Ok(ImagePayload::new(
                format!("{}-4k", source_image.data),
                "image/png",
            )),
        }
    }

    fn generate_model(&self) -> &str {
        Self::GENERATE_MODEL
    }

    fn edit_model(&self) -> &str {
        Self::EDIT_MODEL
    }
}

/// Host whose key selection outcome is scripted.
#[derive(Default)]
pub struct MockHost {
    has_key: AtomicBool,
    grant_on_select: bool,
    select_calls: AtomicUsize,
    reject_calls: AtomicUsize,
}

impl MockHost {
    pub fn new(has_key: bool) -> Self {
        Self {
            has_key: AtomicBool::new(has_key),
            ..Default::default()
        }
    }

    /// A selection action that results in a usable key.
    pub fn granting(mut self) -> Self {
        self.grant_on_select = true;
        self
    }

    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    pub fn reject_calls(&self) -> usize {
        self.reject_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorizationHost for MockHost {
    async fn has_selected_key(&self) -> Result<bool> {
        Ok(self.has_key.load(Ordering::SeqCst))
    }

    async fn open_select_key(&self) -> Result<()> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if self.grant_on_select {
            self.has_key.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn reject_key(&self) -> Result<()> {
        self.reject_calls.fetch_add(1, Ordering::SeqCst);
        self.has_key.store(false, Ordering::SeqCst);
        Ok(())
    }
}
