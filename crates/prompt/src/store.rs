//! Prompt template file loading.

use std::fs;
use std::path::PathBuf;

use crate::PromptError;

/// Loads prompt templates from a directory by file name.
#[derive(Debug, Clone)]
pub struct PromptStore {
    prompts_dir: PathBuf,
}

impl PromptStore {
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
        }
    }

    /// Reads the named template file. A missing file is a fatal
    /// configuration error, surfaced with the full path.
    pub fn load(&self, file_name: &str) -> Result<String, PromptError> {
        let path = self.prompts_dir.join(file_name);
        fs::read_to_string(&path).map_err(|source| PromptError::Io { path, source })
    }
}
