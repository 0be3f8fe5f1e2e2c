use crate::constants;
use crate::error::{AppError, AppResult};

/// The two shipped variants of the annotator. They differ only in prompt
/// verbosity and whether the aggregate keywords.json export is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Short prompt, no JSON export.
    Minimal,
    /// Verbose prompt with in-context tag examples, JSON export enabled.
    Export,
}

impl Variant {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Some(Variant::Minimal),
            "export" => Some(Variant::Export),
            _ => None,
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Variant::Minimal => constants::MINIMAL_PROMPT,
            Variant::Export => constants::VERBOSE_PROMPT,
        }
    }

    pub fn export_enabled(&self) -> bool {
        matches!(self, Variant::Export)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub model: String,
    pub variant: Variant,
}

impl Config {
    /// Reads configuration from the environment. The API key is required:
    /// startup fails here rather than on the first model call.
    pub fn from_env() -> AppResult<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("GEMINI_API_KEY is not set (a .env file works too)".to_string())
            })?;

        let model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| constants::DEFAULT_MODEL.to_string());

        let variant = match std::env::var("ANNOTATE_MODE") {
            Ok(raw) => Variant::parse(&raw).ok_or_else(|| {
                AppError::Config(format!(
                    "ANNOTATE_MODE must be 'minimal' or 'export', got '{}'",
                    raw
                ))
            })?,
            Err(_) => Variant::Export,
        };

        Ok(Self {
            host,
            port,
            api_key,
            model,
            variant,
        })
    }
}
