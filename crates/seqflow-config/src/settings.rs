//! Provider connection settings

use crate::error::{ConfigError, Result};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

pub const ENV_SERVER_URL: &str = "SEQ_SERVER_URL";
pub const ENV_API_KEY: &str = "SEQ_API_KEY";
pub const ENV_INSECURE_SKIP_VERIFY: &str = "SEQ_INSECURE_SKIP_VERIFY";
pub const ENV_TIMEOUT_SECONDS: &str = "SEQ_TIMEOUT_SECONDS";

/// Request timeout used when neither config nor environment set one
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Provider settings as written by the operator (all optional)
///
/// Values come from the `provider { ... }` block of `seq.kdl` or from CLI
/// flags. Unset values fall back to the environment in [`ProviderConfig::resolve`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub server_url: Option<String>,
    pub api_key: Option<String>,
    pub insecure_skip_verify: Option<bool>,
    pub timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("server_url", &self.server_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ProviderConfig {
    /// Layer `other` on top of `self`; values set in `other` win
    pub fn overlay(self, other: ProviderConfig) -> ProviderConfig {
        ProviderConfig {
            server_url: other.server_url.or(self.server_url),
            api_key: other.api_key.or(self.api_key),
            insecure_skip_verify: other.insecure_skip_verify.or(self.insecure_skip_verify),
            timeout_seconds: other.timeout_seconds.or(self.timeout_seconds),
        }
    }

    /// Resolve against the process environment
    pub fn resolve(&self) -> Result<ProviderSettings> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve using `env` to look up `SEQ_*` variables
    ///
    /// Environment values that do not parse are ignored. A timeout of zero
    /// counts as unset.
    pub fn resolve_with<F>(&self, env: F) -> Result<ProviderSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = first_non_blank([self.server_url.clone(), env(ENV_SERVER_URL)])
            .ok_or(ConfigError::MissingServerUrl)?;
        let server_url = parse_server_url(raw_url.trim())?;

        let api_key =
            first_non_blank([self.api_key.clone(), env(ENV_API_KEY)]).map(SecretString::from);

        let insecure_skip_verify = self
            .insecure_skip_verify
            .or_else(|| env(ENV_INSECURE_SKIP_VERIFY).and_then(|v| parse_bool(&v)))
            .unwrap_or(false);

        let timeout_seconds = self
            .timeout_seconds
            .filter(|secs| *secs > 0)
            .or_else(|| {
                env(ENV_TIMEOUT_SECONDS)
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
            })
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        Ok(ProviderSettings {
            server_url,
            api_key,
            insecure_skip_verify,
            timeout: Duration::from_secs(timeout_seconds),
        })
    }
}

/// Fully resolved settings used to build the HTTP client
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub server_url: Url,
    pub api_key: Option<SecretString>,
    pub insecure_skip_verify: bool,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn new(server_url: Url) -> Self {
        Self {
            server_url,
            api_key: None,
            insecure_skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }
}

fn parse_server_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidServerUrl(e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::InvalidServerUrl(
            "server_url must include scheme and host, e.g. http://localhost:5342".to_string(),
        ));
    }
    Ok(url)
}

fn first_non_blank<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

/// Accepts the same spellings as Go's `strconv.ParseBool`
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
