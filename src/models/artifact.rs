use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StudioError};
use crate::models::ImagePayload;

/// Appended to the producing model id of an upscaled artifact.
pub const UPSCALED_MARKER: &str = " (Upscaled)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MediaType {
    #[default]
    #[serde(rename = "image/png")]
    Png,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Png => "png",
        }
    }
}

/// One produced image. Never mutated once created; an upscale produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub id: String,
    pub payload: String,
    pub media_type: MediaType,
    pub source_prompt: String,
    pub producing_model: String,
    pub created_at: DateTime<Utc>,
}

impl GeneratedArtifact {
    pub fn new(
        payload: impl Into<String>,
        source_prompt: impl Into<String>,
        producing_model: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payload: payload.into(),
            media_type: MediaType::Png,
            source_prompt: source_prompt.into(),
            producing_model: producing_model.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_upscaled(&self) -> bool {
        self.producing_model.contains(UPSCALED_MARKER)
    }

    pub fn image(&self) -> ImagePayload {
        ImagePayload::new(self.payload.clone(), self.media_type.as_str())
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type.as_str(), self.payload)
    }

    pub fn download_file_name(&self) -> String {
        format!("{}.{}", self.id, self.media_type.extension())
    }

    /// Decodes the payload and writes it into `dir`, returning the file path.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let bytes = self.image().decode()?;
        tokio::fs::create_dir_all(dir.as_ref()).await?;
        let path = dir.as_ref().join(self.download_file_name());
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

/// What one orchestrator submission produced.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeSet {
    Single(GeneratedArtifact),
    /// `artifacts` is non-empty and in angle order; it may hold fewer than
    /// seven entries. `authorization_failure` is the first failed angle whose
    /// message was an entitlement failure, if any.
    Batch {
        artifacts: Vec<GeneratedArtifact>,
        authorization_failure: Option<StudioError>,
    },
}

impl OutcomeSet {
    pub fn len(&self) -> usize {
        match self {
            OutcomeSet::Single(_) => 1,
            OutcomeSet::Batch { artifacts, .. } => artifacts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_artifacts(self) -> Vec<GeneratedArtifact> {
        match self {
            OutcomeSet::Single(artifact) => vec![artifact],
            OutcomeSet::Batch { artifacts, .. } => artifacts,
        }
    }

    /// Entitlement failure seen by a batch that still produced images.
    pub fn authorization_failure(&self) -> Option<&StudioError> {
        match self {
            OutcomeSet::Single(_) => None,
            OutcomeSet::Batch {
                authorization_failure,
                ..
            } => authorization_failure.as_ref(),
        }
    }
}
