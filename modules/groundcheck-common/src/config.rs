use std::str::FromStr;
use std::time::Duration;

use crate::error::GroundcheckError;

/// Which rhetoric detector runs alongside page fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhetoricMode {
    /// One batched model call over all titles and snippets.
    Model,
    /// Local keyword patterns only.
    Keywords,
    Off,
}

impl FromStr for RhetoricMode {
    type Err = GroundcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "model" | "llm" => Ok(RhetoricMode::Model),
            "keywords" | "fast" => Ok(RhetoricMode::Keywords),
            "off" | "none" => Ok(RhetoricMode::Off),
            other => Err(GroundcheckError::Config(format!(
                "RHETORIC_MODE must be model, keywords or off, got {other:?}"
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Credentials are required; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    // Search
    pub google_api_key: String,
    pub google_cse_id: String,
    pub fact_check_api_key: Option<String>,
    pub search_result_count: usize,
    pub search_language: String,

    // Oracle
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_vision_model: String,

    // Fetching
    pub fetch_timeout: Duration,
    pub max_content_chars: usize,
    pub max_evidence_chars: usize,

    // Rate limits (permits per window)
    pub search_rate_limit: usize,
    pub oracle_rate_limit: usize,
    pub rate_limit_window: Duration,

    // Rhetoric
    pub rhetoric_mode: RhetoricMode,
    pub rhetoric_grace: Duration,

    // Web server
    pub api_host: String,
    pub api_port: u16,
}

/// First few characters of a secret plus its length, safe for logs.
fn preview(val: &str) -> String {
    let head: String = val.chars().take(5).collect();
    format!("{}...({} chars)", head, val.chars().count())
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    /// Fails before anything is served when a credential is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, GroundcheckError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build a config from any key lookup. Used by `from_env` and tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GroundcheckError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let config = Self {
            google_api_key: env.required("GOOGLE_API_KEY")?,
            google_cse_id: env.required("GOOGLE_CSE_ID")?,
            fact_check_api_key: env.optional("GOOGLE_FACT_CHECK_API_KEY"),
            search_result_count: env.parsed("SEARCH_RESULT_COUNT", 5)?,
            search_language: env.optional("SEARCH_LANGUAGE").unwrap_or_else(|| "en".to_string()),
            gemini_api_key: env.required("GEMINI_API_KEY")?,
            gemini_model: env
                .optional("GEMINI_MODEL")
                .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            gemini_vision_model: env
                .optional("GEMINI_VISION_MODEL")
                .unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            fetch_timeout: Duration::from_secs(env.parsed("FETCH_TIMEOUT_SECS", 10)?),
            max_content_chars: env.parsed("MAX_CONTENT_CHARS", 4000)?,
            max_evidence_chars: env.parsed("MAX_EVIDENCE_CHARS", 24_000)?,
            search_rate_limit: env.parsed("SEARCH_RATE_LIMIT", 50)?,
            oracle_rate_limit: env.parsed("ORACLE_RATE_LIMIT", 100)?,
            rate_limit_window: Duration::from_secs(env.parsed("RATE_LIMIT_WINDOW_SECS", 60)?),
            rhetoric_mode: env.parsed("RHETORIC_MODE", RhetoricMode::Model)?,
            rhetoric_grace: Duration::from_millis(env.parsed("RHETORIC_GRACE_MS", 2000)?),
            api_host: env.optional("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port: env.parsed("API_PORT", 5000)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), GroundcheckError> {
        if self.search_result_count == 0 || self.search_result_count > 10 {
            return Err(GroundcheckError::Config(format!(
                "SEARCH_RESULT_COUNT must be between 1 and 10, got {}",
                self.search_result_count
            )));
        }
        if self.search_rate_limit == 0 || self.oracle_rate_limit == 0 {
            return Err(GroundcheckError::Config(
                "rate limits must allow at least one request per window".to_string(),
            ));
        }
        if self.rate_limit_window.is_zero() {
            return Err(GroundcheckError::Config(
                "RATE_LIMIT_WINDOW_SECS must be greater than zero".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(GroundcheckError::Config(
                "FETCH_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.max_content_chars == 0 {
            return Err(GroundcheckError::Config(
                "MAX_CONTENT_CHARS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_keys(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  GOOGLE_API_KEY: {}", preview(&self.google_api_key));
        tracing::info!("  GOOGLE_CSE_ID: {}", preview(&self.google_cse_id));
        tracing::info!("  GOOGLE_FACT_CHECK_API_KEY: {}", preview_opt(&self.fact_check_api_key));
        tracing::info!("  GEMINI_API_KEY: {}", preview(&self.gemini_api_key));
        tracing::info!(
            model = self.gemini_model.as_str(),
            results = self.search_result_count,
            timeout_secs = self.fetch_timeout.as_secs(),
            rhetoric = ?self.rhetoric_mode,
            "  pipeline settings"
        );
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, GroundcheckError> {
        self.optional(key).ok_or_else(|| {
            GroundcheckError::Config(format!("{key} environment variable is required"))
        })
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, GroundcheckError>
    where
        T: FromStr,
    {
        match self.optional(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| {
                GroundcheckError::Config(format!("{key} has an invalid value: {raw:?}"))
            }),
        }
    }
}
