//! AI writing assistant: selection checks, rewrite prompts, and a blocking
//! chat completions client shared by Mistral and OpenAI.

pub mod assistant;
pub mod client;
pub mod prompt;
pub mod selection;

pub use assistant::Assistant;
pub use client::{AiError, ChatClient};
pub use prompt::{ChatMessage, PromptRequest, RewriteAction, DEFAULT_LANGUAGE, DEFAULT_SUMMARY_WORDS};
pub use selection::{validate_selection, SelectionError};
