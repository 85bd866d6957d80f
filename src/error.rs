use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudioError {
    /// Missing required input. Raised before any call is issued.
    #[error("{0}")]
    ValidationError(String),
    /// The external image capability failed; carries the service message as-is.
    #[error("{0}")]
    CapabilityError(String),
    /// A capability failure whose message matched the entitlement pattern.
    #[error("{0}")]
    AuthorizationError(String),
    /// Every call of a concurrent batch failed; carries one representative message.
    #[error("{0}")]
    BatchExhaustionError(String),
    #[error("An API key must be selected before generating images")]
    NotAuthorized,
    #[error("Artifact {0} has already been upscaled")]
    AlreadyUpscaled(String),
    #[error("Artifact {0} not found")]
    ArtifactNotFound(String),
    #[error("Artifact {0} is already in the result store")]
    DuplicateArtifact(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl StudioError {
    pub fn is_authorization(&self) -> bool {
        matches!(self, StudioError::AuthorizationError(_))
    }

    /// Message of an underlying call failure, if this error came from one.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            StudioError::CapabilityError(msg)
            | StudioError::AuthorizationError(msg)
            | StudioError::BatchExhaustionError(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        StudioError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
