use std::collections::HashSet;

use crate::{
    error::{Result, StudioError},
    models::GeneratedArtifact,
};

/// Ordered artifacts, most relevant first. Ids are unique.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    artifacts: Vec<GeneratedArtifact>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the current contents. A repeated id keeps its first occurrence.
    pub fn replace_all(&mut self, artifacts: Vec<GeneratedArtifact>) {
        let mut seen = HashSet::with_capacity(artifacts.len());
        self.artifacts = artifacts
            .into_iter()
            .filter(|artifact| {
                let fresh = seen.insert(artifact.id.clone());
                if !fresh {
                    log::warn!("⚠️  Dropping duplicate artifact {}", artifact.id);
                }
                fresh
            })
            .collect();
    }

    /// Puts `artifact` first and keeps everything already stored.
    pub fn prepend(&mut self, artifact: GeneratedArtifact) -> Result<()> {
        if self.contains(&artifact.id) {
            return Err(StudioError::DuplicateArtifact(artifact.id));
        }
        self.artifacts.insert(0, artifact);
        Ok(())
    }

    pub fn select(&self, id: &str) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|artifact| artifact.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.select(id).is_some()
    }

    pub fn first(&self) -> Option<&GeneratedArtifact> {
        self.artifacts.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.artifacts.iter()
    }

    pub fn as_slice(&self) -> &[GeneratedArtifact] {
        &self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn clear(&mut self) {
        self.artifacts.clear();
    }
}
