use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// How long the interviewer waits for each answer.
    pub answer_timeout: Duration,
    /// How long the voice agent waits for the next question before hanging up.
    pub question_timeout: Duration,
    /// How long the voice agent listens for the founder to start and finish speaking.
    pub speech_timeout: Duration,
    /// Pause between consecutive scripted questions.
    pub question_pause: Duration,
    pub questions_path: Option<PathBuf>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let answer_timeout = Duration::from_secs(u64_var("ANSWER_TIMEOUT_SECS", 120)?);
        let question_timeout = Duration::from_secs(u64_var("QUESTION_TIMEOUT_SECS", 300)?);
        let speech_timeout = Duration::from_secs(u64_var("SPEECH_TIMEOUT_SECS", 60)?);
        let question_pause = Duration::from_millis(u64_var("QUESTION_PAUSE_MS", 1000)?);

        let questions_path = std::env::var("QUESTIONS_PATH").ok().map(PathBuf::from);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            answer_timeout,
            question_timeout,
            speech_timeout,
            question_pause,
            questions_path,
            log_level,
        })
    }
}

fn u64_var(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
