// Application settings
// Loaded from ~/.config/quillgrid/settings.json

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use quillgrid_history::HistoryConfig;

/// AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIProvider {
    /// AI features disabled (default)
    #[default]
    None,
    /// Mistral chat completions API
    Mistral,
    /// OpenAI chat completions API
    #[serde(rename = "openai")]
    OpenAI,
}

impl AIProvider {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AIProvider::None)
    }

    /// Lowercase identifier, used for key lookup
    pub fn name(&self) -> &'static str {
        match self {
            AIProvider::None => "none",
            AIProvider::Mistral => "mistral",
            AIProvider::OpenAI => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            AIProvider::None => "",
            AIProvider::Mistral => "mistral-small-latest",
            AIProvider::OpenAI => "gpt-4o-mini",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            AIProvider::None => "",
            AIProvider::Mistral => "https://api.mistral.ai/v1/chat/completions",
            AIProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Some(AIProvider::None),
            "mistral" => Some(AIProvider::Mistral),
            "openai" => Some(AIProvider::OpenAI),
            _ => None,
        }
    }
}

/// AI-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AISettings {
    pub provider: AIProvider,

    /// Model identifier; empty = provider default
    pub model: String,

    /// Chat completions URL; None = provider default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    pub temperature: f32,

    pub timeout_secs: u64,

    /// Longest selection sent for rewriting (characters)
    pub max_text_length: usize,

    /// Surrounding document text sent with a request (characters)
    pub context_chars: usize,
}

impl Default for AISettings {
    fn default() -> Self {
        Self {
            provider: AIProvider::None,
            model: String::new(),
            endpoint: None,
            temperature: 0.7,
            timeout_secs: 30,
            max_text_length: 5000,
            context_chars: 500,
        }
    }
}

impl AISettings {
    /// Get the effective model (user-specified or provider default)
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    pub fn effective_endpoint(&self) -> &str {
        match self.endpoint.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => self.provider.default_endpoint(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Editor
    #[serde(rename = "editor.debounceMs")]
    pub debounce_ms: u64,

    #[serde(rename = "editor.maxHistoryEntries")]
    pub max_history_entries: usize,

    // File
    #[serde(rename = "file.maxFileSizeBytes")]
    pub max_file_size_bytes: u64,

    #[serde(rename = "file.maxImportRows")]
    pub max_import_rows: usize,

    // Viewer
    #[serde(rename = "viewer.maxTableRows")]
    pub max_table_rows: usize,

    // AI
    #[serde(rename = "ai", default)]
    pub ai: AISettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            max_history_entries: 50,
            max_file_size_bytes: 50 * 1024 * 1024,
            max_import_rows: 10_000,
            max_table_rows: 1000,
            ai: AISettings::default(),
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "settings file error: {}", e),
            SettingsError::Parse(e) => write!(f, "invalid settings.json: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Editor history
    "editor.debounceMs": 500,
    "editor.maxHistoryEntries": 50,

    // File handling
    "file.maxFileSizeBytes": 52428800,
    "file.maxImportRows": 10000,

    // Spreadsheet viewer
    "viewer.maxTableRows": 1000,

    // AI (disabled by default)
    // Provider options: "none", "mistral", "openai"
    // API keys are stored in system keychain or QUILLGRID_<PROVIDER>_KEY, not in this file
    "ai": {
        "provider": "none",
        "model": "",
        "temperature": 0.7,
        "timeoutSecs": 30,
        "maxTextLength": 5000,
        "contextChars": 500
    }
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quillgrid");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, writing a commented default file when none
    /// exists. Read and parse failures are logged and yield defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            Self::create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("{}; using default settings", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines that start with `//`
    pub fn parse(contents: &str) -> Result<Self, SettingsError> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(SettingsError::Parse)
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(SettingsError::Parse)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }

    /// Debounce and capacity for the editor history
    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig::new(self.debounce_ms, self.max_history_entries)
    }
}
