//! Assistant session: the sidebar state between a request and applying it.
//!
//! Holds the latest suggestion or error message. Applying a suggestion only
//! produces new document content; the caller hands that to the edit history
//! as an external replacement so it lands as its own undo step.

use quillgrid_config::ResolvedAIConfig;
use quillgrid_document::replace_first;

use crate::client::{AiError, ChatClient};
use crate::prompt::RewriteAction;
use crate::selection::validate_selection;

pub struct Assistant {
    client: ChatClient,
    max_text_length: usize,
    context_chars: usize,
    suggestion: Option<String>,
    error: Option<String>,
    last_action: Option<&'static str>,
}

impl Assistant {
    pub fn new(config: &ResolvedAIConfig) -> Result<Self, AiError> {
        Ok(Self::with_client(
            ChatClient::new(config)?,
            config.max_text_length,
            config.context_chars,
        ))
    }

    pub fn with_client(client: ChatClient, max_text_length: usize, context_chars: usize) -> Self {
        Self {
            client,
            max_text_length,
            context_chars,
            suggestion: None,
            error: None,
            last_action: None,
        }
    }

    /// Run `action` on the selected `text`.
    ///
    /// A new run replaces both the previous suggestion and error. Invalid
    /// selections fail before any request is made.
    pub fn run(&mut self, action: &RewriteAction, text: &str, context: &str) -> Result<&str, AiError> {
        self.suggestion = None;
        self.error = None;
        self.last_action = Some(action.name());

        let result = validate_selection(text, self.max_text_length)
            .map_err(AiError::from)
            .and_then(|()| {
                let request = action.build(text, context, self.context_chars);
                self.client.complete(&request)
            });

        match result {
            Ok(content) => Ok(self.suggestion.insert(content).as_str()),
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the first occurrence of `selected` in `content` with the
    /// current suggestion and clear it.
    ///
    /// Returns None, keeping the suggestion, when there is nothing to apply
    /// or the selection no longer appears in the content.
    pub fn apply(&mut self, content: &str, selected: &str) -> Option<String> {
        let suggestion = self.suggestion.as_deref()?;
        let replaced = replace_first(content, selected, suggestion);
        if replaced.is_some() {
            self.suggestion = None;
        } else {
            log::warn!("selection no longer present in document; suggestion not applied");
        }
        replaced
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_action(&self) -> Option<&'static str> {
        self.last_action
    }

    pub fn clear_suggestion(&mut self) {
        self.suggestion = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }
}
