//! Data-path configuration.
//!
//! External interactions: loaded from the environment variables
//! COACH_DATA_DIR, COACH_DATABASE_URL, COACH_PROMPTS_DIR; every value has a
//! working default for a checkout-local layout.

use std::env;
use std::path::PathBuf;

/// Where the dataset, the feature store, and the prompt templates live.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub exercise_results_path: PathBuf,
    pub database_url: String,
    pub prompts_dir: PathBuf,
}

impl DataConfig {
    /// Loads from the environment; unset variables fall back to `./data` and
    /// `./prompts`.
    pub fn from_env() -> Self {
        Self::resolve(
            env::var("COACH_DATA_DIR").ok(),
            env::var("COACH_DATABASE_URL").ok(),
            env::var("COACH_PROMPTS_DIR").ok(),
        )
    }

    fn resolve(
        data_dir: Option<String>,
        database_url: Option<String>,
        prompts_dir: Option<String>,
    ) -> Self {
        let data_dir = PathBuf::from(data_dir.unwrap_or_else(|| "./data".to_string()));
        let database_url = database_url
            .unwrap_or_else(|| data_dir.join("features.db").to_string_lossy().into_owned());

        Self {
            exercise_results_path: data_dir.join("exercise_results.jsonl"),
            database_url,
            prompts_dir: PathBuf::from(prompts_dir.unwrap_or_else(|| "./prompts".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DataConfig::resolve(None, None, None);
        assert_eq!(
            config.exercise_results_path,
            PathBuf::from("./data/exercise_results.jsonl")
        );
        assert_eq!(config.database_url, "./data/features.db");
        assert_eq!(config.prompts_dir, PathBuf::from("./prompts"));
    }

    #[test]
    fn test_explicit_database_url_wins() {
        let config = DataConfig::resolve(
            Some("/srv/coach".to_string()),
            Some("sqlite:///srv/coach/store.db".to_string()),
            None,
        );
        assert_eq!(
            config.exercise_results_path,
            PathBuf::from("/srv/coach/exercise_results.jsonl")
        );
        assert_eq!(config.database_url, "sqlite:///srv/coach/store.db");
    }
}
