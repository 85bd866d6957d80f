use crate::{
    auth::AuthState,
    capability::{AuthorizationHost, ImageCapability},
    error::{Result, StudioError},
    models::{BatchRequest, GeneratedArtifact},
    orchestrator::Orchestrator,
    store::ResultStore,
};

/// Session state behind the studio UI: results, the open viewer, the
/// user-visible error and the authorized flag. Mutations only happen after a
/// call has settled.
pub struct Studio<C, H> {
    orchestrator: Orchestrator<C>,
    host: H,
    store: ResultStore,
    auth: AuthState,
    /// Set when the service refused the selected key; the host is told before
    /// the next selection.
    key_rejected: bool,
    selected: Option<String>,
    error: Option<String>,
}

impl<C: ImageCapability, H: AuthorizationHost> Studio<C, H> {
    /// Starts unauthorized; call `init` to ask the host.
    pub fn new(orchestrator: Orchestrator<C>, host: H) -> Self {
        Self {
            orchestrator,
            host,
            store: ResultStore::new(),
            auth: AuthState::default(),
            key_rejected: false,
            selected: None,
            error: None,
        }
    }

    pub async fn init(&mut self) -> Result<bool> {
        let authorized = self.host.has_selected_key().await?;
        self.auth.set_authorized(authorized);
        log::info!(
            "🔑 API key {}",
            if authorized { "selected" } else { "not selected" }
        );
        Ok(authorized)
    }

    /// Runs the host's key selection, then asks again whether a key is set.
    pub async fn authorize(&mut self) -> Result<bool> {
        if self.key_rejected {
            self.host.reject_key().await?;
            self.key_rejected = false;
        }
        self.host.open_select_key().await?;
        let authorized = self.host.has_selected_key().await?;
        self.auth.set_authorized(authorized);
        if authorized {
            self.error = None;
        }
        Ok(authorized)
    }

    /// Runs a generate or angle batch and replaces the results with its output.
    pub async fn submit(&mut self, request: &BatchRequest) -> Result<&[GeneratedArtifact]> {
        self.ensure_authorized()?;
        self.error = None;

        match self.orchestrator.submit(request).await {
            Ok(outcome) => {
                // Images from a partial batch are kept and no error is shown,
                // but an entitlement failure still drops authorization.
                if let Some(err) = outcome.authorization_failure() {
                    self.observe_authorization(err);
                }
                self.store.replace_all(outcome.into_artifacts());
                self.selected = None;
                Ok(self.store.as_slice())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Upscales a stored artifact; the result is prepended and opened in the viewer.
    pub async fn upscale(&mut self, id: &str) -> Result<GeneratedArtifact> {
        self.ensure_authorized()?;
        self.error = None;

        let source = match self.store.select(id).cloned() {
            Some(artifact) => artifact,
            None => return Err(self.fail(StudioError::ArtifactNotFound(id.to_string()))),
        };

        let upscaled = match self.orchestrator.upscale(&source).await {
            Ok(artifact) => artifact,
            Err(e) => return Err(self.fail(e)),
        };

        if let Err(e) = self.store.prepend(upscaled.clone()) {
            return Err(self.fail(e));
        }
        self.selected = Some(upscaled.id.clone());
        Ok(upscaled)
    }

    /// Whether the upscale action should be offered for `id`.
    pub fn can_upscale(&self, id: &str) -> bool {
        self.store
            .select(id)
            .map_or(false, |artifact| !artifact.is_upscaled())
    }

    /// Opens the viewer on `id` if it is stored.
    pub fn select(&mut self, id: &str) -> Option<&GeneratedArtifact> {
        if self.store.contains(id) {
            self.selected = Some(id.to_string());
        }
        self.selected()
    }

    pub fn close_viewer(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&GeneratedArtifact> {
        self.selected.as_deref().and_then(|id| self.store.select(id))
    }

    pub fn results(&self) -> &ResultStore {
        &self.store
    }

    pub fn auth(&self) -> AuthState {
        self.auth
    }

    pub fn is_authorized(&self) -> bool {
        self.auth.is_authorized()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn orchestrator(&self) -> &Orchestrator<C> {
        &self.orchestrator
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn ensure_authorized(&mut self) -> Result<()> {
        self.auth.ensure().map_err(|e| self.fail(e))
    }

    fn observe_authorization(&mut self, err: &StudioError) {
        if self.auth.observe(err) {
            self.key_rejected = true;
        }
    }

    fn fail(&mut self, err: StudioError) -> StudioError {
        log::error!("❌ {}", err);
        self.observe_authorization(&err);
        self.error = Some(err.to_string());
        err
    }
}
