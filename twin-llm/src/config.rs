//! Model and provider configuration
//!
//! Settings come from the process environment (after `.env` has been loaded
//! by the binary). Every reader takes a lookup function so tests never have
//! to touch the real environment.

use crate::error::{Error, ErrorKind, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Model used when `TWIN_MODEL` is not set
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Sampling temperature used when `TWIN_TEMPERATURE` is not set
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// HTTP request timeout for hosted providers when `TWIN_TIMEOUT_SECS` is not set
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Local models load slowly on first use, so Ollama waits longer by default
pub const OLLAMA_TIMEOUT_SECS: u64 = 300;

pub const MODEL_VAR: &str = "TWIN_MODEL";
pub const TEMPERATURE_VAR: &str = "TWIN_TEMPERATURE";
pub const MAX_TOKENS_VAR: &str = "TWIN_MAX_TOKENS";
pub const TIMEOUT_VAR: &str = "TWIN_TIMEOUT_SECS";
pub const BASE_URL_VAR: &str = "TWIN_BASE_URL";

// ============================================================================
// Provider selection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    OpenAI,
    Anthropic,
    /// Local Ollama server speaking the OpenAI-compatible API
    Ollama,
}

impl ProviderType {
    /// The prefix used in model strings (`openai/gpt-4o-mini`)
    pub fn prefix(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Ollama => "ollama",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix.to_ascii_lowercase().as_str() {
            "openai" => Some(ProviderType::OpenAI),
            "anthropic" => Some(ProviderType::Anthropic),
            "ollama" => Some(ProviderType::Ollama),
            _ => None,
        }
    }

    /// Environment variable holding the API key, if the provider needs one
    pub fn credential_var(&self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderType::Ollama => None,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "https://api.openai.com/v1",
            ProviderType::Anthropic => "https://api.anthropic.com/v1",
            ProviderType::Ollama => "http://localhost:11434/v1",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A `provider/model` pair such as `openai/gpt-4o-mini`.
///
/// A bare model name (no `/`) is an OpenAI model. Only the first `/` splits,
/// so Ollama tags like `ollama/library/llama3` keep their slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: ProviderType,
    pub model: String,
}

impl ModelSpec {
    pub fn new(provider: ProviderType, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let (provider, model) = match spec.split_once('/') {
            Some((prefix, model)) => {
                let provider = ProviderType::from_prefix(prefix).ok_or_else(|| {
                    Error::config_invalid(MODEL_VAR, format!("unknown provider '{}'", prefix))
                        .with_context("model", spec)
                })?;
                (provider, model.trim())
            }
            None => (ProviderType::OpenAI, spec),
        };

        if model.is_empty() {
            return Err(Error::config_invalid(MODEL_VAR, "model name is empty")
                .with_context("model", spec));
        }

        Ok(Self::new(provider, model))
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self::new(ProviderType::OpenAI, "gpt-4o-mini")
    }
}

impl FromStr for ModelSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

// ============================================================================
// Sampling
// ============================================================================

/// Sampling parameters sent with every completion request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: None,
        }
    }
}

impl SamplingConfig {
    /// Set the temperature, rejecting values outside `0.0..=2.0`
    pub fn with_temperature(mut self, temperature: f32) -> Result<Self> {
        validate_temperature(temperature)?;
        self.temperature = Some(temperature);
        Ok(self)
    }

    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = Some(max);
        self
    }
}

fn validate_temperature(temperature: f32) -> Result<()> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(Error::config_invalid(
            TEMPERATURE_VAR,
            format!("temperature {} is outside 0.0..=2.0", temperature),
        ));
    }
    Ok(())
}

// ============================================================================
// Model settings
// ============================================================================

/// Which model to call and how
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: ModelSpec,
    pub sampling: SamplingConfig,
    /// Overrides the provider's default timeout
    pub timeout_secs: Option<u64>,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: ModelSpec::default(),
            sampling: SamplingConfig::default(),
            timeout_secs: None,
            base_url: None,
        }
    }
}

impl ModelSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Unset or blank variables fall back to
    /// defaults; malformed ones are `ConfigInvalid`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(model) = get(MODEL_VAR) {
            settings.model = ModelSpec::parse(&model)?;
        }

        if let Some(raw) = get(TEMPERATURE_VAR) {
            let temperature: f32 = parse_number(TEMPERATURE_VAR, &raw)?;
            settings.sampling = settings.sampling.with_temperature(temperature)?;
        }

        if let Some(raw) = get(MAX_TOKENS_VAR) {
            let max: usize = parse_number(MAX_TOKENS_VAR, &raw)?;
            if max == 0 {
                return Err(Error::config_invalid(MAX_TOKENS_VAR, "must be greater than zero"));
            }
            settings.sampling = settings.sampling.with_max_tokens(max);
        }

        if let Some(raw) = get(TIMEOUT_VAR) {
            let secs: u64 = parse_number(TIMEOUT_VAR, &raw)?;
            if secs == 0 {
                return Err(Error::config_invalid(TIMEOUT_VAR, "must be greater than zero"));
            }
            settings.timeout_secs = Some(secs);
        }

        settings.base_url = get(BASE_URL_VAR).map(|url| url.trim_end_matches('/').to_string());

        Ok(settings)
    }

}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        Error::new(ErrorKind::ConfigInvalid, format!("'{}' is not valid: {}", raw, e))
            .with_context("setting", key)
    })
}

// ============================================================================
// Provider configuration
// ============================================================================

/// Endpoint, credential and defaults for one provider
#[derive(Clone)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub headers: HashMap<String, String>,
    pub timeout_secs: u64,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider_type", &self.provider_type)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::OpenAI,
            api_key: Some(api_key.into()),
            base_url: ProviderType::OpenAI.default_base_url().into(),
            default_model: "gpt-4o-mini".into(),
            headers: HashMap::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn anthropic(api_key: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("anthropic-version".into(), "2023-06-01".into());

        Self {
            provider_type: ProviderType::Anthropic,
            api_key: Some(api_key.into()),
            base_url: ProviderType::Anthropic.default_base_url().into(),
            default_model: "claude-3-5-haiku-latest".into(),
            headers,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Local Ollama server, no credential needed
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::Ollama,
            api_key: None,
            base_url: ProviderType::Ollama.default_base_url().into(),
            default_model: model.into(),
            headers: HashMap::new(),
            timeout_secs: OLLAMA_TIMEOUT_SECS,
        }
    }

    /// Build the config for `settings`, reading the provider's credential
    /// through `lookup`.
    ///
    /// Fails with `ConfigMissing` when a hosted provider has no key.
    pub fn resolve<F>(settings: &ModelSettings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = settings.model.provider;
        let mut config = match provider.credential_var() {
            Some(var) => {
                let key = lookup(var)
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| {
                        Error::config_missing(var)
                            .with_operation("provider_config::resolve")
                            .with_context("provider", provider.prefix())
                    })?;
                match provider {
                    ProviderType::Anthropic => Self::anthropic(key),
                    _ => Self::openai(key),
                }
            }
            None => Self::ollama(settings.model.model.clone()),
        };

        config = config.with_model(settings.model.model.clone());
        if let Some(secs) = settings.timeout_secs {
            config = config.with_timeout(secs);
        }
        if let Some(url) = &settings.base_url {
            config = config.with_base_url(url.clone());
        }
        Ok(config)
    }

    /// Like [`ProviderConfig::resolve`], reading the real environment
    pub fn from_env(settings: &ModelSettings) -> Result<Self> {
        Self::resolve(settings, |key| std::env::var(key).ok())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Ensure a credential is present when the provider needs one
    pub(crate) fn require_credential(&self) -> Result<&str> {
        match (self.provider_type.credential_var(), self.api_key.as_deref()) {
            (_, Some(key)) if !key.trim().is_empty() => Ok(key),
            (Some(var), _) => Err(Error::config_missing(var)
                .with_context("provider", self.provider_type.prefix())),
            (None, _) => Ok(""),
        }
    }
}
