//! API credential configuration.
//!
//! Credentials are an explicitly passed object rather than process-global
//! state: each [`ApiCredentials`] instance resolves its key source at most
//! once and reuses the resolved value for every request made through it.

use std::fmt;

use tokio::sync::OnceCell;

use crate::error::{Result, StockDataError};

/// Where an API key comes from.
#[derive(Clone)]
pub enum KeySource {
    /// A key value supplied directly.
    Literal(String),
    /// The name of an environment variable holding the key.
    Env(String),
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(_) => f.write_str("Literal([REDACTED])"),
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
        }
    }
}

/// Upstream API credentials with resolve-once semantics.
#[derive(Debug)]
pub struct ApiCredentials {
    source: KeySource,
    resolved: OnceCell<String>,
}

impl ApiCredentials {
    /// Creates credentials from a key value supplied directly.
    #[must_use]
    pub fn from_key(key: impl Into<String>) -> Self {
        Self::new(KeySource::Literal(key.into()))
    }

    /// Creates credentials resolved from an environment variable.
    #[must_use]
    pub fn from_env(var: impl Into<String>) -> Self {
        Self::new(KeySource::Env(var.into()))
    }

    /// Creates credentials from an explicit [`KeySource`].
    #[must_use]
    pub fn new(source: KeySource) -> Self {
        Self {
            source,
            resolved: OnceCell::new(),
        }
    }

    /// Returns the API key, resolving the source on first use.
    ///
    /// # Errors
    /// Returns [`StockDataError::NotConfigured`] if the source yields no
    /// usable key. Failed resolutions are not sticky; a later call retries.
    pub async fn api_key(&self) -> Result<&str> {
        let key = self
            .resolved
            .get_or_try_init(|| async { self.resolve() })
            .await?;
        Ok(key.as_str())
    }

    fn resolve(&self) -> Result<String> {
        let key = match &self.source {
            KeySource::Literal(key) => key.clone(),
            KeySource::Env(var) => std::env::var(var).map_err(|_| {
                StockDataError::NotConfigured(format!("environment variable {var} is not set"))
            })?,
        };

        if key.trim().is_empty() {
            return Err(StockDataError::NotConfigured(
                "API key is empty".to_string(),
            ));
        }
        Ok(key)
    }
}
