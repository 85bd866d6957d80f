use serde::{Deserialize, Serialize};

use crate::models::{AspectRatio, ImagePayload, QualityTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// One high-quality text-to-image call.
    #[default]
    Generate,
    /// Seven concurrent edits of a source image, one per camera angle.
    EditByAngle,
}

/// Parameters of one orchestrator submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub mode: GenerationMode,
    pub instruction: Option<String>,
    pub source_image: Option<ImagePayload>,
    pub aspect_ratio: AspectRatio,
    /// Only read in generate mode.
    pub quality: QualityTier,
}

impl BatchRequest {
    pub fn generate(prompt: impl Into<String>) -> Self {
        Self {
            mode: GenerationMode::Generate,
            instruction: Some(prompt.into()),
            ..Default::default()
        }
    }

    pub fn edit_by_angle(source_image: ImagePayload) -> Self {
        Self {
            mode: GenerationMode::EditByAngle,
            source_image: Some(source_image),
            ..Default::default()
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn with_source_image(mut self, image: ImagePayload) -> Self {
        self.source_image = Some(image);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_quality(mut self, quality: QualityTier) -> Self {
        self.quality = quality;
        self
    }

    /// The instruction with surrounding whitespace removed, if any remains.
    pub fn trimmed_instruction(&self) -> Option<&str> {
        self.instruction
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
