use std::env;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::{
    capability::AuthorizationHost,
    error::{Result, StudioError},
};

/// Message fragment the image service returns when the selected key has no
/// access to the model.
pub const DEFAULT_AUTH_ERROR_PATTERN: &str = "Requested entity was not found.";

/// Decides whether a failure message is an entitlement problem. The service's
/// wording is not part of any contract, so this is replaceable.
pub trait AuthErrorMatcher: Send + Sync {
    fn is_authorization_failure(&self, message: &str) -> bool;
}

impl<F> AuthErrorMatcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_authorization_failure(&self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    pattern: String,
}

impl SubstringMatcher {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Default for SubstringMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_ERROR_PATTERN)
    }
}

impl AuthErrorMatcher for SubstringMatcher {
    fn is_authorization_failure(&self, message: &str) -> bool {
        // An empty pattern would match every message.
        !self.pattern.is_empty() && message.contains(&self.pattern)
    }
}

/// Promotes a capability failure to `AuthorizationError` when its message
/// matches. Every other error passes through untouched.
pub fn classify(matcher: &dyn AuthErrorMatcher, err: StudioError) -> StudioError {
    match err {
        StudioError::CapabilityError(msg) if matcher.is_authorization_failure(&msg) => {
            StudioError::AuthorizationError(msg)
        }
        other => other,
    }
}

/// The process-wide "authorized" flag, held by whoever drives the
/// orchestrator instead of living in a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthState {
    authorized: bool,
}

impl AuthState {
    pub fn new(authorized: bool) -> Self {
        Self { authorized }
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn set_authorized(&mut self, authorized: bool) {
        self.authorized = authorized;
    }

    /// Drops authorization when `err` is an entitlement failure. Returns
    /// whether the flag flipped.
    pub fn observe(&mut self, err: &StudioError) -> bool {
        if err.is_authorization() && self.authorized {
            log::warn!("🔑 Authorization lost: {}", err);
            self.authorized = false;
            return true;
        }
        false
    }

    pub fn ensure(&self) -> Result<()> {
        if self.authorized {
            Ok(())
        } else {
            Err(StudioError::NotAuthorized)
        }
    }
}

/// The API key in use, shared by the host that selects it and the client
/// that sends it. Reads always see the latest selection.
#[derive(Clone, Default)]
pub struct ApiKeySlot {
    key: Arc<RwLock<Option<String>>>,
}

impl ApiKeySlot {
    pub fn new(key: Option<String>) -> Self {
        let slot = Self::default();
        slot.set(key);
        slot
    }

    pub fn get(&self) -> Option<String> {
        self.key
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Blank keys are stored as no key.
    pub fn set(&self, key: Option<String>) {
        let key = key.filter(|k| !k.trim().is_empty());
        *self
            .key
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = key;
    }

    pub fn take(&self) -> Option<String> {
        self.key
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

impl fmt::Debug for ApiKeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeySlot")
            .field("is_set", &self.is_set())
            .finish()
    }
}

type KeySource = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Host that selects the API key found in `.env` or the process environment.
/// A key the service rejected is not selected again until it changes.
pub struct EnvKeyHost {
    slot: ApiKeySlot,
    source: KeySource,
    rejected: Mutex<Option<String>>,
}

impl EnvKeyHost {
    pub fn new(slot: ApiKeySlot) -> Self {
        Self {
            slot,
            source: Arc::new(read_env_key),
            rejected: Mutex::new(None),
        }
    }

    /// Replaces where `open_select_key` looks for a key.
    pub fn with_source(
        mut self,
        source: impl Fn() -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.source = Arc::new(source);
        self
    }

    pub fn slot(&self) -> &ApiKeySlot {
        &self.slot
    }

    fn rejected(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.rejected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `GEMINI_API_KEY` (or `API_KEY`), read from `.env` first so edits to the
/// file are picked up without a restart, then from the environment.
fn read_env_key() -> Option<String> {
    let from_file: Vec<(String, String)> = match dotenv::dotenv_iter() {
        Ok(iter) => iter.filter_map(|item| item.ok()).collect(),
        Err(_) => {
            log::debug!("No .env file found while selecting API key");
            Vec::new()
        }
    };
    let file_value = |name: &str| {
        from_file
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    file_value("GEMINI_API_KEY")
        .or_else(|| file_value("API_KEY"))
        .or_else(|| env::var("GEMINI_API_KEY").ok())
        .or_else(|| env::var("API_KEY").ok())
        .filter(|key| !key.trim().is_empty())
}

#[async_trait]
impl AuthorizationHost for EnvKeyHost {
    async fn has_selected_key(&self) -> Result<bool> {
        Ok(self.slot.is_set())
    }

    async fn open_select_key(&self) -> Result<()> {
        let candidate = (self.source)();
        let mut rejected = self.rejected();

        match candidate {
            Some(key) if rejected.as_deref() == Some(key.as_str()) => {
                log::warn!(
                    "⚠️  The configured API key was already rejected; set a key with image model access"
                );
            }
            Some(key) => {
                log::info!("🔑 API key selected");
                *rejected = None;
                self.slot.set(Some(key));
            }
            None => {
                log::info!("💡 Set GEMINI_API_KEY to select a key with image model access");
            }
        }
        Ok(())
    }

    async fn reject_key(&self) -> Result<()> {
        if let Some(key) = self.slot.take() {
            *self.rejected() = Some(key);
        }
        Ok(())
    }
}
