use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use legal_common::gateway::BackendKind;
use legal_common::retry::RetryPolicy;

use crate::error::AppError;

/// Parameters sent with every model request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.1,
        }
    }
}

/// Application configuration loaded explicitly from environment variables.
///
/// Backend connection details (URLs, API key, request timeout) are read by the backend
/// clients themselves; see `legal_common::openai` and `legal_common::local`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which model backend to construct: `LLM_BACKEND=remote|local`.
    pub backend: BackendKind,
    pub generation: GenerationSettings,
    /// Caller-side retries around the gateway. Zero disables the decorator.
    pub retry: RetryPolicy,
    /// Redis connection URL. `None` disables the record store.
    pub redis_url: Option<String>,
    /// Optional expiry for stored records.
    pub record_ttl: Option<Duration>,
    /// Directory receiving generated documents.
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (defaults in parentheses):
    /// - `LLM_BACKEND` (`remote`)
    /// - `LLM_MAX_TOKENS` (1000), `LLM_TEMPERATURE` (0.1)
    /// - `LLM_MAX_RETRIES` (0), `LLM_RETRY_INITIAL_MS` (200), `LLM_RETRY_MAX_MS` (5000)
    /// - `REDIS_URL`, `RECORD_TTL_SECS`
    /// - `DOCUMENT_OUTPUT_DIR` (`./generated_documents`)
    ///
    /// A variable that is set but unparsable is an error rather than silently defaulted.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match get("LLM_BACKEND") {
            Some(raw) => BackendKind::from_str(&raw)?,
            None => BackendKind::Remote,
        };

        let defaults = GenerationSettings::default();
        let generation = GenerationSettings {
            max_tokens: parse_or(get("LLM_MAX_TOKENS"), "LLM_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_or(get("LLM_TEMPERATURE"), "LLM_TEMPERATURE", defaults.temperature)?,
        };
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(AppError::Config(format!(
                "LLM_TEMPERATURE must be within 0.0..=2.0, got {}",
                generation.temperature
            )));
        }

        let retry_defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_retries: parse_or(get("LLM_MAX_RETRIES"), "LLM_MAX_RETRIES", retry_defaults.max_retries)?,
            initial_backoff: Duration::from_millis(parse_or(
                get("LLM_RETRY_INITIAL_MS"),
                "LLM_RETRY_INITIAL_MS",
                retry_defaults.initial_backoff.as_millis() as u64,
            )?),
            max_backoff: Duration::from_millis(parse_or(
                get("LLM_RETRY_MAX_MS"),
                "LLM_RETRY_MAX_MS",
                retry_defaults.max_backoff.as_millis() as u64,
            )?),
        };

        let record_ttl = match get("RECORD_TTL_SECS") {
            Some(raw) => match parse_required::<u64>(&raw, "RECORD_TTL_SECS")? {
                0 => {
                    return Err(AppError::Config(
                        "RECORD_TTL_SECS must be positive; leave it unset to keep records".to_string(),
                    ))
                }
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        let output_dir = get("DOCUMENT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./generated_documents"));

        Ok(Self {
            backend,
            generation,
            retry,
            redis_url: get("REDIS_URL"),
            record_ttl,
            output_dir,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, AppError> {
    match raw {
        Some(raw) => parse_required(&raw, key),
        None => Ok(default),
    }
}

fn parse_required<T: FromStr>(raw: &str, key: &str) -> Result<T, AppError> {
    raw.parse::<T>()
        .map_err(|_| AppError::Config(format!("{key} has an invalid value: '{raw}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.backend, BackendKind::Remote);
        assert_eq!(config.generation, GenerationSettings::default());
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.redis_url.is_none());
        assert!(config.record_ttl.is_none());
        assert_eq!(config.output_dir, PathBuf::from("./generated_documents"));
    }

    #[test]
    fn explicit_values_are_used() {
        let config = load(&[
            ("LLM_BACKEND", "local"),
            ("LLM_MAX_TOKENS", "512"),
            ("LLM_TEMPERATURE", "0.3"),
            ("LLM_MAX_RETRIES", "2"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
            ("RECORD_TTL_SECS", "3600"),
            ("DOCUMENT_OUTPUT_DIR", "/tmp/docs"),
        ])
        .unwrap();
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.generation.max_tokens, 512);
        assert_eq!(config.generation.temperature, 0.3);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
        assert_eq!(config.record_ttl, Some(Duration::from_secs(3600)));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/docs"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("REDIS_URL", "  "), ("LLM_BACKEND", "")]).unwrap();
        assert!(config.redis_url.is_none());
        assert_eq!(config.backend, BackendKind::Remote);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(load(&[("LLM_MAX_TOKENS", "lots")]), Err(AppError::Config(_))));
        assert!(matches!(load(&[("LLM_TEMPERATURE", "9")]), Err(AppError::Config(_))));
        assert!(matches!(load(&[("LLM_BACKEND", "gpu")]), Err(AppError::Common(_))));
    }

    #[test]
    fn zero_record_ttl_is_rejected() {
        let err = load(&[("RECORD_TTL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("RECORD_TTL_SECS")));
        assert_eq!(
            load(&[("RECORD_TTL_SECS", "1")]).unwrap().record_ttl,
            Some(Duration::from_secs(1))
        );
    }
}
