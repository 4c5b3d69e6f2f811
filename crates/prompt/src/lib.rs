//! # Prompt
//!
//! Loads plain-text prompt templates and fills their `{name}` placeholders
//! from a [`SessionContext`].
//!
//! ## Templates
//!
//! - **system_prompt.txt** – fixed system instruction, no placeholders
//! - **user_prompt.txt** – the per-session user prompt
//! - **scenario_ok.txt / scenario_nok.txt** – narrative picked by NOK status
//!
//! ## External interactions
//!
//! - **AI models**: rendered output is sent to the chat completion API.
//! - **Filesystem**: templates are read from a prompts directory; a missing
//!   file is a configuration error for the caller.

mod context;
mod store;

pub use context::{build_context, scenario_description, scenario_file, SessionContext};
pub use store::PromptStore;

use std::path::PathBuf;

use thiserror::Error;

/// File name of the fixed system prompt.
pub const SYSTEM_PROMPT: &str = "system_prompt.txt";
/// File name of the user prompt template.
pub const USER_PROMPT: &str = "user_prompt.txt";
/// Scenario template for a satisfactory session.
pub const SCENARIO_OK: &str = "scenario_ok.txt";
/// Scenario template for a session flagged not-okay.
pub const SCENARIO_NOK: &str = "scenario_nok.txt";

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("failed to read prompt template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template names a field the context does not have. Templates and
    /// context fields must stay in sync; this is not recoverable at runtime.
    #[error("template references unknown field `{field}`")]
    MissingField { field: String },

    #[error("unclosed placeholder starting at byte {position}")]
    UnclosedPlaceholder { position: usize },

    #[error("unmatched `}}` at byte {position}")]
    UnmatchedBrace { position: usize },
}

/// Renders `template` by substituting every `{name}` placeholder with the
/// matching context field. `{{` and `}}` escape literal braces.
///
/// A placeholder naming a field the context lacks is a fatal
/// [`PromptError::MissingField`]; context fields the template never mentions
/// are fine.
pub fn render(template: &str, context: &SessionContext) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, ch)) => field.push(ch),
                        None => return Err(PromptError::UnclosedPlaceholder { position }),
                    }
                }
                match context.get(&field) {
                    Some(value) => out.push_str(value),
                    None => return Err(PromptError::MissingField { field }),
                }
            }
            '}' => return Err(PromptError::UnmatchedBrace { position }),
            _ => out.push(c),
        }
    }

    Ok(out)
}
