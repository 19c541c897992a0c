//! config-rs/lib.rs
//! Shared configuration for the accountability pipeline crates.
//! Values come from the process environment, optionally seeded from a `.env` file.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Read an environment variable and parse it, falling back to `default`.
///
/// A variable that is present but unparseable is logged and ignored.
pub fn get_env_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Invalid value for {}: {:?}, using default", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Read an optional string variable; empty values count as unset.
pub fn get_optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// How blunt generated feedback is allowed to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CulturalDirectness {
    Low,
    Medium,
    High,
}

impl fmt::Display for CulturalDirectness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for CulturalDirectness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown directness level '{}'", other)),
        }
    }
}

/// Output format for the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// All tunables of the evaluation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    // Model provider
    pub llm_provider: Option<String>,
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub llm_api_url: Option<String>,
    pub model_name: String,
    pub llm_max_retries: u32,
    pub llm_initial_retry_delay_ms: u64,
    pub llm_max_retry_delay_ms: u64,
    pub llm_request_timeout_secs: u64,

    // Ethics and sensitivity
    pub cultural_directness: CulturalDirectness,
    pub cooling_off_period_hours: i64,
    pub safety_confidence_threshold: f64,
    pub min_ai_confidence_threshold: f64,
    pub max_input_chars: usize,
    pub low_acceptance_threshold: f64,
    pub acceptance_window_days: i64,

    // Routing defaults
    pub selected_industry: String,
    pub default_language: String,

    // Timings
    pub classification_timeout_secs: u64,
    pub follow_up_delay_secs: u64,
    pub cache_ttl_secs: u64,
    pub job_retention_secs: u64,

    // Integrations
    pub slack_webhook_url: Option<String>,

    // Logging
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            llm_provider: None,
            openai_api_key: None,
            groq_api_key: None,
            llm_api_url: None,
            model_name: "gpt-4o".to_string(),
            llm_max_retries: 3,
            llm_initial_retry_delay_ms: 1000,
            llm_max_retry_delay_ms: 10_000,
            llm_request_timeout_secs: 60,

            cultural_directness: CulturalDirectness::High,
            cooling_off_period_hours: 48,
            safety_confidence_threshold: 0.8,
            min_ai_confidence_threshold: 0.75,
            max_input_chars: 15_000,
            low_acceptance_threshold: 0.5,
            acceptance_window_days: 30,

            selected_industry: "generic".to_string(),
            default_language: "en".to_string(),

            classification_timeout_secs: 45,
            follow_up_delay_secs: 10,
            cache_ttl_secs: 3600,
            job_retention_secs: 3600,

            slack_webhook_url: None,

            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl PipelineSettings {
    /// Load settings from the environment after reading `.env` if present.
    pub fn from_env() -> Self {
        if dotenv::dotenv().is_ok() {
            log::debug!("Loaded environment overrides from .env");
        }

        let d = Self::default();
        let settings = Self {
            llm_provider: get_optional_var("LLM_PROVIDER").map(|p| p.to_lowercase()),
            openai_api_key: get_optional_var("LLM_API_KEY")
                .or_else(|| get_optional_var("OPENAI_API_KEY")),
            groq_api_key: get_optional_var("GROQ_API_KEY"),
            llm_api_url: get_optional_var("LLM_API_URL"),
            model_name: get_env_var("LLM_MODEL", d.model_name),
            llm_max_retries: get_env_var("LLM_MAX_RETRIES", d.llm_max_retries),
            llm_initial_retry_delay_ms: get_env_var(
                "LLM_INITIAL_RETRY_DELAY_MS",
                d.llm_initial_retry_delay_ms,
            ),
            llm_max_retry_delay_ms: get_env_var("LLM_MAX_RETRY_DELAY_MS", d.llm_max_retry_delay_ms),
            llm_request_timeout_secs: get_env_var(
                "LLM_REQUEST_TIMEOUT_SECS",
                d.llm_request_timeout_secs,
            ),

            cultural_directness: get_env_var("CULTURAL_DIRECTNESS_LEVEL", d.cultural_directness),
            cooling_off_period_hours: get_env_var(
                "COOLING_OFF_PERIOD_HOURS",
                d.cooling_off_period_hours,
            ),
            safety_confidence_threshold: get_env_var(
                "SAFETY_CONFIDENCE_THRESHOLD",
                d.safety_confidence_threshold,
            ),
            min_ai_confidence_threshold: get_env_var(
                "MIN_AI_CONFIDENCE_THRESHOLD",
                d.min_ai_confidence_threshold,
            ),
            max_input_chars: get_env_var("MAX_INPUT_CHARS", d.max_input_chars),
            low_acceptance_threshold: get_env_var(
                "LOW_ACCEPTANCE_THRESHOLD",
                d.low_acceptance_threshold,
            ),
            acceptance_window_days: get_env_var("ACCEPTANCE_WINDOW_DAYS", d.acceptance_window_days),

            selected_industry: get_env_var("SELECTED_INDUSTRY", d.selected_industry).to_lowercase(),
            default_language: get_env_var("DEFAULT_LANGUAGE", d.default_language),

            classification_timeout_secs: get_env_var(
                "CLASSIFICATION_TIMEOUT_SECS",
                d.classification_timeout_secs,
            ),
            follow_up_delay_secs: get_env_var("FOLLOW_UP_DELAY_SECONDS", d.follow_up_delay_secs),
            cache_ttl_secs: get_env_var("CACHE_TTL_SECS", d.cache_ttl_secs),
            job_retention_secs: get_env_var("JOB_RETENTION_SECS", d.job_retention_secs),

            slack_webhook_url: get_optional_var("SLACK_WEBHOOK_URL"),

            log_level: get_env_var("LOG_LEVEL", d.log_level).to_lowercase(),
            log_format: get_env_var("LOG_FORMAT", d.log_format),
        };

        log::info!(
            "Pipeline settings loaded: model={}, industry={}, directness={}, timeout={}s",
            settings.model_name,
            settings.selected_industry,
            settings.cultural_directness,
            settings.classification_timeout_secs
        );
        settings
    }

    pub fn classification_timeout(&self) -> Duration {
        Duration::from_secs(self.classification_timeout_secs)
    }

    pub fn follow_up_delay(&self) -> Duration {
        Duration::from_secs(self.follow_up_delay_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// How long a finished job's status stays pollable.
    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }

    pub fn cooling_off_period(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cooling_off_period_hours)
    }
}
