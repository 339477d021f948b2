//! Token refresh action.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use gatework_protocols::{ActionError, JobAction, TokenStore};

/// Key the refresh action reads and writes by default.
pub const TOKEN_KEY: &str = "token";

/// Value the default transform writes.
pub const REFRESHED_TOKEN: &str = "new_token";

/// Conventional token value before any refresh has run.
pub const INITIAL_TOKEN: &str = "old_token";

type TokenTransform = dyn Fn(&str) -> String + Send + Sync;

/// Action that rewrites a stored token.
///
/// Each fire reads the token under the configured key, applies the
/// transform and writes the result back. The default transform writes
/// the fixed [`REFRESHED_TOKEN`] value, which keeps a fire directly
/// observable in the store; real deployments swap in their own
/// transform with [`with_transform`](RefreshTokenAction::with_transform).
///
/// The action is idempotent as long as the transform is deterministic,
/// which the scheduler's retry semantics rely on.
pub struct RefreshTokenAction {
    store: Arc<dyn TokenStore>,
    key: String,
    transform: Arc<TokenTransform>,
}

impl RefreshTokenAction {
    /// Create an action refreshing [`TOKEN_KEY`] in `store`.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            key: TOKEN_KEY.to_string(),
            transform: Arc::new(|_| REFRESHED_TOKEN.to_string()),
        }
    }

    /// Refresh a different key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Replace the default transform.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.transform = Arc::new(transform);
        self
    }
}

#[async_trait]
impl JobAction for RefreshTokenAction {
    async fn execute(&self) -> Result<(), ActionError> {
        let current = self.store.get_string(&self.key, "").await?;
        let refreshed = (self.transform)(&current);
        self.store.set_string(&self.key, &refreshed).await?;
        debug!("refreshed token under '{}'", self.key);
        Ok(())
    }
}
