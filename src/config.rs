use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const CATALOG_FILE_NAME: &str = "messages.po";
pub const BACKUP_FILE_NAME: &str = "messages.po.bak";
pub const PROMPT_FILE_NAME: &str = "LLM-prompt.txt";
pub const CREATIVE_PROMPT_FILE_NAME: &str = "LLM-prompt-creative.txt";

#[derive(Debug, Clone)]
pub struct Config {
    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
    pub max_completion_tokens: u32,

    // Project layout
    pub project_dir: PathBuf,

    // Translation
    pub default_locale: String,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub temperature: f32,
    pub creative_temperature: f32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let project_dir =
            PathBuf::from(std::env::var("PROJECT_DIR").context("PROJECT_DIR not set")?);
        if !project_dir.is_dir() {
            anyhow::bail!("PROJECT_DIR does not exist: {}", project_dir.display());
        }

        Ok(Self {
            // OpenAI
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY not set")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            max_completion_tokens: std::env::var("MAX_COMPLETION_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4096),

            project_dir,

            // Translation
            default_locale: std::env::var("DEFAULT_LOCALE")
                .unwrap_or_else(|_| "en".to_string()),
            batch_size: std::env::var("BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(30),
            batch_delay_ms: std::env::var("BATCH_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            temperature: std::env::var("TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.2),
            creative_temperature: std::env::var("CREATIVE_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.8),
        })
    }

    /// Directory holding one subdirectory per locale plus the prompt files.
    pub fn catalog_root(&self) -> PathBuf {
        self.project_dir.join("src").join("i18n")
    }

    /// Path of the prompt template for the selected mode.
    pub fn prompt_path(&self, creative: bool) -> PathBuf {
        let name = if creative {
            CREATIVE_PROMPT_FILE_NAME
        } else {
            PROMPT_FILE_NAME
        };
        self.catalog_root().join(name)
    }

    /// Sampling temperature for the selected mode.
    pub fn temperature_for(&self, creative: bool) -> f32 {
        if creative {
            self.creative_temperature
        } else {
            self.temperature
        }
    }

    pub fn catalog_path(&self, locale: &str) -> PathBuf {
        self.catalog_root().join(locale).join(CATALOG_FILE_NAME)
    }
}

/// Backup path next to a catalog file: `messages.po` -> `messages.po.bak`.
pub fn backup_path(catalog_path: &Path) -> PathBuf {
    catalog_path.with_file_name(BACKUP_FILE_NAME)
}
