// Rewrite actions and the chat messages they send

use serde::{Deserialize, Serialize};

/// Word target when a summary length is not given
pub const DEFAULT_SUMMARY_WORDS: u32 = 100;
/// Target language when a translation language is not given
pub const DEFAULT_LANGUAGE: &str = "Spanish";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Messages plus the completion budget for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

/// What to do with the selected text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteAction {
    Improve,
    Summarize { max_words: u32 },
    Expand,
    Translate { language: String },
    Custom { prompt: String },
}

impl RewriteAction {
    /// Parse an action name with its optional argument.
    ///
    /// `summarize` takes a word count, `translate` a language and `custom`
    /// the system prompt, which is required.
    pub fn parse(name: &str, arg: Option<&str>) -> Result<Self, String> {
        let arg = arg.map(str::trim).filter(|a| !a.is_empty());
        match name.trim().to_ascii_lowercase().as_str() {
            "improve" => Ok(RewriteAction::Improve),
            "expand" => Ok(RewriteAction::Expand),
            "summarize" | "summarise" => {
                let max_words = match arg {
                    Some(n) => n
                        .parse::<u32>()
                        .map_err(|_| format!("Invalid word count: {}", n))?,
                    None => DEFAULT_SUMMARY_WORDS,
                };
                Ok(RewriteAction::Summarize { max_words })
            }
            "translate" => Ok(RewriteAction::Translate {
                language: arg.unwrap_or(DEFAULT_LANGUAGE).to_string(),
            }),
            "custom" => match arg {
                Some(prompt) => Ok(RewriteAction::Custom {
                    prompt: prompt.to_string(),
                }),
                None => Err("Custom action needs a prompt".to_string()),
            },
            other => Err(format!(
                "Unknown action '{}'. Use improve, summarize, expand, translate or custom.",
                other
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RewriteAction::Improve => "improve",
            RewriteAction::Summarize { .. } => "summarize",
            RewriteAction::Expand => "expand",
            RewriteAction::Translate { .. } => "translate",
            RewriteAction::Custom { .. } => "custom",
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            RewriteAction::Improve => 300,
            RewriteAction::Summarize { max_words } => max_words.saturating_mul(2),
            RewriteAction::Expand => 600,
            RewriteAction::Translate { .. } => 400,
            RewriteAction::Custom { .. } => 500,
        }
    }

    /// Whether surrounding document text is sent along with the selection
    pub fn uses_context(&self) -> bool {
        matches!(
            self,
            RewriteAction::Improve | RewriteAction::Expand | RewriteAction::Custom { .. }
        )
    }

    /// Build the request for `text`, attaching at most `context_chars`
    /// characters of `context` for actions that use it.
    pub fn build(&self, text: &str, context: &str, context_chars: usize) -> PromptRequest {
        let (system, user) = match self {
            RewriteAction::Improve => (
                "You are a professional editor. Improve the given text for clarity, grammar, and \
                 readability while maintaining the original meaning. Keep the response concise."
                    .to_string(),
                format!("Please improve this text: \"{}\"", text),
            ),
            RewriteAction::Summarize { max_words } => (
                format!(
                    "You are a summarization expert. Create a concise summary of the given text in \
                     approximately {} words or less.",
                    max_words
                ),
                format!("Please summarize this text: \"{}\"", text),
            ),
            RewriteAction::Expand => (
                "You are a content writer. Expand the given text with additional relevant details, \
                 examples, and context while maintaining coherence."
                    .to_string(),
                format!("Please expand this text with more detail: \"{}\"", text),
            ),
            RewriteAction::Translate { language } => (
                format!(
                    "You are a professional translator. Translate the given text to {} while \
                     maintaining the original tone and meaning.",
                    language
                ),
                format!("Please translate this text to {}: \"{}\"", language, text),
            ),
            RewriteAction::Custom { prompt } => (prompt.clone(), format!("Text: \"{}\"", text)),
        };

        let mut user = user;
        if self.uses_context() && !context.is_empty() {
            let excerpt: String = context.chars().take(context_chars).collect();
            user.push_str("\n\nContext: ");
            user.push_str(&excerpt);
        }

        PromptRequest {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_tokens: self.max_tokens(),
        }
    }
}
