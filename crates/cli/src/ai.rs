//! `quillgrid ai` - configuration checks, key storage and one-shot rewrites.

use std::io::{self, Read};
use std::path::Path;

use clap::Subcommand;
use serde_json::json;

use quillgrid_ai::{Assistant, RewriteAction};
use quillgrid_config::{ai as keys, AIConfigStatus, AIDiagnostics, AIProvider, ResolvedAIConfig, Settings};

use crate::exit_codes::{EXIT_AI_DISABLED, EXIT_AI_KEYCHAIN_ERR, EXIT_AI_MISSING_KEY};
use crate::CliError;

#[derive(Subcommand)]
pub enum AiCommands {
    /// Show the resolved AI configuration
    Doctor {
        /// Output as JSON for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a piece of text and print the suggestion
    #[command(after_help = "\
Actions: improve, summarize, expand, translate, custom

Examples:
  quillgrid ai rewrite improve \"teh quick brown fox\"
  quillgrid ai rewrite summarize \"$(cat notes.txt)\" --arg 50
  quillgrid ai rewrite translate \"Good morning\" --arg French
  quillgrid ai rewrite custom \"roses are red\" --arg \"Make it rhyme\"")]
    Rewrite {
        action: String,

        text: String,

        /// Word count (summarize), language (translate) or prompt (custom)
        #[arg(long)]
        arg: Option<String>,

        /// Surrounding document text sent with improve/expand/custom
        #[arg(long, default_value = "")]
        context: String,
    },

    /// Store an API key in the system keychain (key read from stdin)
    SetKey {
        /// mistral or openai
        provider: String,
    },

    /// Choose the AI provider in settings.json
    SetProvider {
        /// none, mistral or openai
        provider: String,

        /// Model name (default: provider default)
        #[arg(long)]
        model: Option<String>,

        /// Chat completions URL (default: provider endpoint)
        #[arg(long)]
        endpoint: Option<String>,
    },
}

pub fn cmd_ai(command: AiCommands, settings: &Settings, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        AiCommands::Doctor { json } => cmd_doctor(settings, config_path, json),
        AiCommands::Rewrite {
            action,
            text,
            arg,
            context,
        } => cmd_rewrite(settings, &action, &text, arg.as_deref(), &context),
        AiCommands::SetKey { provider } => cmd_set_key(&provider),
        AiCommands::SetProvider {
            provider,
            model,
            endpoint,
        } => cmd_set_provider(settings, config_path, &provider, model, endpoint),
    }
}

fn cmd_doctor(settings: &Settings, config_path: Option<&Path>, json: bool) -> Result<(), CliError> {
    let config = ResolvedAIConfig::from_settings(&settings.ai);
    let diag = AIDiagnostics::from_resolved(&config);

    if json {
        let output = json!({
            "schema_version": 1,
            "status": diag.status.as_str(),
            "blocking_reason": diag.blocking_reason,
            "provider": diag.provider,
            "model": diag.model,
            "endpoint": diag.endpoint,
            "timeout_secs": diag.timeout_secs,
            "key": if diag.key_present { "present" } else { "missing" },
            "key_source": diag.key_source.as_str(),
            "keychain": if diag.keychain_available { "ok" } else { "unavailable" },
        });
        let text = serde_json::to_string_pretty(&output).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
    } else {
        print!("{}", diag);
        let path = config_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(Settings::config_path_display);
        println!("Settings:          {}", path);
    }

    match config.status {
        AIConfigStatus::Ready => Ok(()),
        AIConfigStatus::Disabled => Err(CliError {
            code: EXIT_AI_DISABLED,
            message: "AI is disabled".to_string(),
            hint: Some("quillgrid ai set-provider mistral".to_string()),
        }),
        AIConfigStatus::MissingKey => Err(CliError {
            code: EXIT_AI_MISSING_KEY,
            message: format!(
                "AI misconfigured: {}",
                config.blocking_reason.unwrap_or_else(|| "missing_api_key".to_string())
            ),
            hint: Some(format!("quillgrid ai set-key {} < key.txt", config.provider.name())),
        }),
    }
}

fn cmd_rewrite(
    settings: &Settings,
    action: &str,
    text: &str,
    arg: Option<&str>,
    context: &str,
) -> Result<(), CliError> {
    let action = RewriteAction::parse(action, arg).map_err(CliError::args)?;
    let config = ResolvedAIConfig::from_settings(&settings.ai);
    let mut assistant = Assistant::new(&config)?;

    log::info!("{} via {} ({})", action.name(), config.provider_name(), config.model);
    let suggestion = assistant.run(&action, text, context)?;
    println!("{}", suggestion);
    Ok(())
}

fn parse_enabled_provider(name: &str) -> Result<AIProvider, CliError> {
    match AIProvider::parse(name) {
        Some(provider) if provider.is_enabled() => Ok(provider),
        _ => Err(CliError::args(format!("unknown provider '{}'", name)).with_hint("use mistral or openai")),
    }
}

fn cmd_set_key(provider: &str) -> Result<(), CliError> {
    let provider = parse_enabled_provider(provider)?;

    let mut key = String::new();
    io::stdin().read_to_string(&mut key)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::args("no key on stdin"));
    }

    keys::set_api_key(provider.name(), key).map_err(|message| CliError {
        code: EXIT_AI_KEYCHAIN_ERR,
        message,
        hint: Some(format!("or export {}", keys::env_var_name(provider.name()))),
    })?;

    eprintln!("Stored {} key in system keychain", provider.name());
    Ok(())
}

fn cmd_set_provider(
    settings: &Settings,
    config_path: Option<&Path>,
    provider: &str,
    model: Option<String>,
    endpoint: Option<String>,
) -> Result<(), CliError> {
    let provider = AIProvider::parse(provider).ok_or_else(|| {
        CliError::args(format!("unknown provider '{}'", provider)).with_hint("use none, mistral or openai")
    })?;

    let mut updated = settings.clone();
    if updated.ai.provider != provider {
        // Model and endpoint belong to the previous provider
        updated.ai.model.clear();
        updated.ai.endpoint = None;
    }
    updated.ai.provider = provider;
    if let Some(model) = model {
        updated.ai.model = model;
    }
    if let Some(endpoint) = endpoint {
        updated.ai.endpoint = Some(endpoint);
    }

    let saved = match config_path {
        Some(path) => updated.save_to(path),
        None => updated.save(),
    };
    saved.map_err(|e| CliError::io(e.to_string()))?;

    println!(
        "AI provider: {} (model: {})",
        provider.name(),
        if provider.is_enabled() { updated.ai.effective_model() } else { "-" }
    );
    Ok(())
}
