//! API key resolution.
//!
//! Keys are looked up on every request rather than captured when a client is
//! built, so rotating the environment variable or activating a new key takes
//! effect on the next call without a restart.

use crate::{Error, Result, config::LlmConfig};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

pub trait CredentialProvider: Send + Sync {
    /// Resolves the key for a single outbound request.
    fn api_key(&self) -> Result<String>;

    fn is_active(&self) -> bool {
        self.api_key().is_ok()
    }
}

/// Reads the key from an environment variable at call time.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredential {
    fn api_key(&self) -> Result<String> {
        match std::env::var(&self.var) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(Error::credential(format!("{} is not set", self.var))),
        }
    }
}

#[derive(Clone)]
pub struct StaticCredential {
    key: String,
}

impl StaticCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl CredentialProvider for StaticCredential {
    fn api_key(&self) -> Result<String> {
        if self.key.trim().is_empty() {
            return Err(Error::credential("configured API key is empty"));
        }
        Ok(self.key.clone())
    }
}

/// A key activated at runtime, falling back to another provider while none is set.
pub struct SharedCredential {
    activated: RwLock<Option<String>>,
    fallback: Arc<dyn CredentialProvider>,
}

impl SharedCredential {
    pub fn new(fallback: Arc<dyn CredentialProvider>) -> Self {
        Self {
            activated: RwLock::new(None),
            fallback,
        }
    }

    pub fn activate(&self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::input("API key must not be empty"));
        }
        let mut slot = self
            .activated
            .write()
            .map_err(|_| Error::internal("credential lock poisoned"))?;
        *slot = Some(key.trim().to_string());
        info!("API key activated");
        Ok(())
    }

    pub fn deactivate(&self) -> Result<()> {
        let mut slot = self
            .activated
            .write()
            .map_err(|_| Error::internal("credential lock poisoned"))?;
        if slot.take().is_some() {
            info!("API key deactivated");
        }
        Ok(())
    }
}

impl CredentialProvider for SharedCredential {
    fn api_key(&self) -> Result<String> {
        let activated = self
            .activated
            .read()
            .map_err(|_| Error::internal("credential lock poisoned"))?;
        if let Some(key) = activated.as_ref() {
            return Ok(key.clone());
        }
        drop(activated);
        debug!("No activated API key, using fallback credential");
        self.fallback.api_key()
    }
}

/// Builds the provider described by the LLM configuration.
pub fn from_config(config: &LlmConfig) -> Arc<dyn CredentialProvider> {
    match config.api_key.as_deref() {
        Some(key) if !key.is_empty() => Arc::new(StaticCredential::new(key)),
        _ => Arc::new(EnvCredential::new(config.api_key_env.clone())),
    }
}
