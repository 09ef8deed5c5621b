//! Loading `OrchestrateSettings` from JSON or the environment.

use std::time::Duration;

use crate::error::ConfigError;
use crate::types::{BackendType, OrchestrateSettings};

pub const ENV_ADDRESS: &str = "ORCHESTRATE_ADDRESS";
pub const ENV_BACKEND: &str = "ORCHESTRATE_BACKEND";
pub const ENV_FRONT: &str = "ORCHESTRATE_FRONT";
pub const ENV_SOCKS: &str = "ORCHESTRATE_SOCKS";
pub const ENV_TIMEOUT_SECS: &str = "ORCHESTRATE_TIMEOUT_SECS";

impl OrchestrateSettings {
    /// Parse settings from a JSON document such as
    /// `{"address": "...", "type": "onion", "socks_config": "socks5h://127.0.0.1:9050"}`.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Read settings from `ORCHESTRATE_*` environment variables.
    ///
    /// Only `ORCHESTRATE_ADDRESS` is required; the backend defaults to HTTPS.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let address = get(ENV_ADDRESS).ok_or(ConfigError::MissingAddress)?;
        let backend = match get(ENV_BACKEND) {
            Some(raw) => raw.parse::<BackendType>()?,
            None => BackendType::default(),
        };
        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ConfigError::Invalid(format!("{ENV_TIMEOUT_SECS} is not a number: {raw}"))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let settings = OrchestrateSettings {
            address,
            backend,
            front: get(ENV_FRONT).unwrap_or_default(),
            socks_config: get(ENV_SOCKS).unwrap_or_default(),
            timeout,
        };
        tracing::debug!(
            address = %settings.address,
            backend = %settings.backend,
            "loaded orchestrate settings from environment"
        );
        Ok(settings)
    }
}
