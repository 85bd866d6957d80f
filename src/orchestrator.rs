use std::sync::Arc;

use futures::future::join_all;

use crate::{
    auth::{classify, AuthErrorMatcher, SubstringMatcher},
    capability::ImageCapability,
    error::{Result, StudioError},
    logger,
    models::{
        AngleSpec, BatchRequest, GeneratedArtifact, GenerationMode, OutcomeSet, QualityTier,
        ANGLES, UPSCALED_MARKER,
    },
};

pub const MISSING_PROMPT: &str = "Please enter a prompt to generate an image.";
pub const MISSING_SOURCE_IMAGE: &str = "Please upload a source image to generate angles.";

/// Turns requests into calls against the image capability and the results
/// into artifacts. Holds no per-session state.
pub struct Orchestrator<C> {
    capability: C,
    matcher: Arc<dyn AuthErrorMatcher>,
}

impl<C: ImageCapability> Orchestrator<C> {
    pub fn new(capability: C) -> Self {
        Self {
            capability,
            matcher: Arc::new(SubstringMatcher::default()),
        }
    }

    pub fn with_matcher(mut self, matcher: impl AuthErrorMatcher + 'static) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }

    pub async fn submit(&self, request: &BatchRequest) -> Result<OutcomeSet> {
        match request.mode {
            GenerationMode::Generate => self.generate(request).await.map(OutcomeSet::Single),
            GenerationMode::EditByAngle => self.edit_by_angle(request).await,
        }
    }

    async fn generate(&self, request: &BatchRequest) -> Result<GeneratedArtifact> {
        let prompt = request
            .trimmed_instruction()
            .ok_or_else(|| StudioError::ValidationError(MISSING_PROMPT.into()))?;

        let payload = self
            .capability
            .generate(prompt, request.quality, request.aspect_ratio)
            .await
            .map_err(|e| self.classify(e))?;

        log::info!("✅ Generated image for prompt: {}", prompt);
        Ok(GeneratedArtifact::new(
            payload.data,
            prompt,
            self.capability.generate_model(),
        ))
    }

    /// Issues one edit per angle, waits for all of them, and keeps the
    /// successes in angle order. An entitlement failure among the angles is
    /// reported on the outcome even when other angles succeeded.
    async fn edit_by_angle(&self, request: &BatchRequest) -> Result<OutcomeSet> {
        let source = request
            .source_image
            .as_ref()
            .ok_or_else(|| StudioError::ValidationError(MISSING_SOURCE_IMAGE.into()))?;
        let instruction = request.trimmed_instruction();
        let aspect_ratio = request.aspect_ratio;

        let _timer = logger::timer("angle batch");

        let calls = ANGLES.iter().map(|angle| {
            let prompt = angle.prompt(instruction);
            async move {
                let result = self.capability.edit(source, &prompt, aspect_ratio).await;
                (angle, prompt, result)
            }
        });
        let settled = join_all(calls).await;

        let mut artifacts = Vec::with_capacity(settled.len());
        let mut failures: Vec<(&AngleSpec, StudioError)> = Vec::new();

        for (angle, prompt, result) in settled {
            match result {
                Ok(payload) => artifacts.push(GeneratedArtifact::new(
                    payload.data,
                    format!("{}: {}", angle.name, prompt),
                    self.capability.edit_model(),
                )),
                Err(e) => {
                    let e = self.classify(e);
                    log::warn!("⚠️  Angle '{}' failed: {}", angle.name, e);
                    failures.push((angle, e));
                }
            }
        }

        log::info!(
            "📊 Angle batch settled: {} succeeded, {} failed",
            artifacts.len(),
            failures.len()
        );

        let authorization_failure = failures
            .iter()
            .find_map(|(_, e)| e.is_authorization().then(|| e.clone()));

        if !artifacts.is_empty() {
            return Ok(OutcomeSet::Batch {
                artifacts,
                authorization_failure,
            });
        }
        if let Some(err) = authorization_failure {
            return Err(err);
        }

        let message = failures
            .into_iter()
            .next()
            .map(|(_, e)| e.to_string())
            .unwrap_or_else(|| "All angle generations failed".to_string());
        Err(StudioError::BatchExhaustionError(message))
    }

    /// Re-renders `artifact` at the highest quality tier. Already-upscaled
    /// artifacts are refused before any call is made.
    pub async fn upscale(&self, artifact: &GeneratedArtifact) -> Result<GeneratedArtifact> {
        if artifact.is_upscaled() {
            return Err(StudioError::AlreadyUpscaled(artifact.id.clone()));
        }

        let payload = self
            .capability
            .upscale(&artifact.image(), &artifact.source_prompt, QualityTier::Ultra)
            .await
            .map_err(|e| self.classify(e))?;

        log::info!("🔍 Upscaled artifact {}", artifact.id);
        Ok(GeneratedArtifact::new(
            payload.data,
            artifact.source_prompt.clone(),
            format!("{}{}", artifact.producing_model, UPSCALED_MARKER),
        ))
    }

    fn classify(&self, err: StudioError) -> StudioError {
        classify(self.matcher.as_ref(), err)
    }
}
