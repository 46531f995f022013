// AI configuration and secrets management
//
// API keys are looked up in:
// 1. System keychain (preferred)
// 2. Environment variables (fallback for CI/headless)
//
// Keys are NEVER stored in settings.json

use std::env;
use std::time::Duration;

use crate::settings::{AIProvider, AISettings, Settings};

/// Service name for keychain storage
const KEYCHAIN_SERVICE: &str = "quillgrid";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Keychain,
    Environment,
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

impl KeyLookup {
    pub fn missing() -> Self {
        Self {
            key: None,
            source: KeySource::None,
        }
    }
}

/// Environment variable holding the key for a provider
pub fn env_var_name(provider: &str) -> String {
    format!("QUILLGRID_{}_KEY", provider.to_uppercase())
}

#[cfg_attr(not(feature = "keychain"), allow(dead_code))]
fn keychain_account(provider: &str) -> String {
    format!("ai/{}", provider.to_lowercase())
}

/// Get an API key for the specified provider
///
/// Checks in order:
/// 1. System keychain
/// 2. Environment variable (QUILLGRID_MISTRAL_KEY, etc.)
pub fn get_api_key(provider: &str) -> KeyLookup {
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider)) {
            if let Ok(key) = entry.get_password() {
                return KeyLookup {
                    key: Some(key),
                    source: KeySource::Keychain,
                };
            }
        }
    }

    let env_name = env_var_name(provider);
    if let Ok(key) = env::var(&env_name) {
        if !key.is_empty() {
            return KeyLookup {
                key: Some(key),
                source: KeySource::Environment,
            };
        }
    }

    KeyLookup::missing()
}

/// Store an API key in the system keychain
#[cfg(feature = "keychain")]
pub fn set_api_key(provider: &str, key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to create keychain entry: {}", e))?;

    entry
        .set_password(key)
        .map_err(|e| format!("Failed to store key in keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn set_api_key(provider: &str, _key: &str) -> Result<(), String> {
    Err(format!(
        "Keychain support not enabled. Set {} instead.",
        env_var_name(provider)
    ))
}

pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "test").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved AI Configuration (single source of truth)
// ============================================================================

/// The effective AI configuration, fully resolved from settings and key lookup.
#[derive(Debug, Clone)]
pub struct ResolvedAIConfig {
    pub provider: AIProvider,
    /// Effective model (settings or provider default)
    pub model: String,
    /// Effective chat completions URL
    pub endpoint: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub max_text_length: usize,
    pub context_chars: usize,
    pub api_key: Option<String>,
    pub key_source: KeySource,
    pub status: AIConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AIConfigStatus {
    /// AI is disabled (provider = None)
    Disabled,
    /// Provider configured and key present
    Ready,
    /// Provider is configured but API key is missing
    MissingKey,
}

impl AIConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl ResolvedAIConfig {
    /// Resolve from settings, looking the key up in keychain/environment
    pub fn from_settings(settings: &AISettings) -> Self {
        let lookup = if settings.provider.is_enabled() {
            get_api_key(settings.provider.name())
        } else {
            KeyLookup::missing()
        };
        Self::with_key(settings, lookup)
    }

    /// Resolve from settings and an already performed key lookup
    pub fn with_key(settings: &AISettings, lookup: KeyLookup) -> Self {
        let provider = settings.provider;

        let (status, blocking_reason) = if !provider.is_enabled() {
            (AIConfigStatus::Disabled, None)
        } else if lookup.key.is_none() {
            (
                AIConfigStatus::MissingKey,
                Some(format!(
                    "No API key found. Set via keychain or {}",
                    env_var_name(provider.name())
                )),
            )
        } else {
            (AIConfigStatus::Ready, None)
        };

        Self {
            provider,
            model: settings.effective_model().to_string(),
            endpoint: settings.effective_endpoint().to_string(),
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
            max_text_length: settings.max_text_length,
            context_chars: settings.context_chars,
            api_key: lookup.key,
            key_source: lookup.source,
            status,
            blocking_reason,
        }
    }

    /// Load settings and resolve in one call
    pub fn load() -> Self {
        let settings = Settings::load();
        Self::from_settings(&settings.ai)
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

// ============================================================================
// Diagnostics (for CLI doctor and debugging)
// ============================================================================

#[derive(Debug)]
pub struct AIDiagnostics {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub status: AIConfigStatus,
    pub blocking_reason: Option<String>,
    pub key_present: bool,
    pub key_source: KeySource,
    pub keychain_available: bool,
    pub timeout_secs: u64,
}

impl AIDiagnostics {
    pub fn from_resolved(config: &ResolvedAIConfig) -> Self {
        Self {
            provider: config.provider.name().to_string(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            status: config.status,
            blocking_reason: config.blocking_reason.clone(),
            key_present: config.api_key.is_some(),
            key_source: config.key_source,
            keychain_available: keychain_available(),
            timeout_secs: config.timeout.as_secs(),
        }
    }
}

impl std::fmt::Display for AIDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AI Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Provider:          {}", self.provider)?;
        writeln!(f, "Status:            {}", self.status.as_str())?;
        if self.status != AIConfigStatus::Disabled {
            writeln!(f, "Model:             {}", self.model)?;
            writeln!(f, "Endpoint:          {}", self.endpoint)?;
            writeln!(f, "Timeout:           {}s", self.timeout_secs)?;
        }
        writeln!(f, "Key present:       {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:        {}", self.key_source.as_str())?;
        writeln!(f, "Keychain available:{}", if self.keychain_available { "yes" } else { "no" })?;
        if let Some(reason) = &self.blocking_reason {
            writeln!(f, "Blocking:          {}", reason)?;
        }
        Ok(())
    }
}
