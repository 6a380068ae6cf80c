use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, time::Duration};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CLASSIFIER_URL: &str =
    "https://api-inference.huggingface.co/models/j-hartmann/emotion-english-distilroberta-base";
pub const ENV_CLASSIFIER_URL: &str = "EMOTION_CLASSIFIER_URL";
pub const ENV_CLASSIFIER_API_KEY: &str = "EMOTION_CLASSIFIER_API_KEY";
pub const ENV_WHISPER_MODEL: &str = "EMOTION_WHISPER_MODEL";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum InputMode {
    WavFile(PathBuf),
    Text(String),
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

/// Upper bound on one external adapter call (transcription or text
/// classification); the analysis itself has no suspension points.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeoutBudget {
    pub target_ms: u64,
}

impl TimeoutBudget {
    pub fn new(target_ms: u64) -> Result<Self, ConfigError> {
        if target_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self { target_ms })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.target_ms)
    }
}

impl Default for TimeoutBudget {
    fn default() -> Self {
        Self {
            target_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhisperConfig {
    pub model_path: Option<PathBuf>,
    pub language: String,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            language: DEFAULT_LANGUAGE.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub api_key: Option<ApiKey>,
    pub offline: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CLASSIFIER_URL.to_owned(),
            api_key: None,
            offline: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub input: InputMode,
    pub whisper: WhisperConfig,
    pub classifier: ClassifierConfig,
    pub timeout: TimeoutBudget,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("timeout must be > 0 ms")]
    ZeroTimeout,
    #[error("classifier endpoint must not be empty")]
    EmptyEndpoint,
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

pub fn resolve_optional_string(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Option<String> {
    match cli_value {
        Some(v) => Some(v),
        None => env.var(env_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_CLASSIFIER_API_KEY, "env-key");
        let key = resolve_api_key(Some("cli-key".to_owned()), ENV_CLASSIFIER_API_KEY, &env)
            .expect("valid key")
            .expect("present");
        assert_eq!(key.expose(), "cli-key");
    }

    #[test]
    fn api_key_env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_CLASSIFIER_API_KEY, "env-key");
        let key = resolve_api_key(None, ENV_CLASSIFIER_API_KEY, &env)
            .expect("valid key")
            .expect("present");
        assert_eq!(key.expose(), "env-key");
    }

    #[test]
    fn api_key_blank_rejected() {
        let env = MapEnv::default();
        let err = resolve_api_key(Some("  ".to_owned()), ENV_CLASSIFIER_API_KEY, &env).unwrap_err();
        assert_eq!(err, ConfigError::EmptyApiKey);
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("hf_secret").expect("valid key");
        assert!(!format!("{key:?}").contains("secret"));
    }

    #[test]
    fn timeout_budget_rejects_zero() {
        assert_eq!(TimeoutBudget::new(0).unwrap_err(), ConfigError::ZeroTimeout);
        assert_eq!(TimeoutBudget::new(500).expect("nonzero").target_ms, 500);
    }

    #[test]
    fn resolve_string_with_default_precedence() {
        let env = MapEnv::default().with_var(ENV_CLASSIFIER_URL, "env");
        let v =
            resolve_string_with_default(Some("cli".to_owned()), ENV_CLASSIFIER_URL, &env, "def");
        assert_eq!(v, "cli");
        let v = resolve_string_with_default(None, ENV_CLASSIFIER_URL, &env, "def");
        assert_eq!(v, "env");
        let v = resolve_string_with_default(None, ENV_CLASSIFIER_URL, &MapEnv::default(), "def");
        assert_eq!(v, "def");
    }

    #[test]
    fn resolve_optional_string_precedence() {
        let env = MapEnv::default().with_var(ENV_WHISPER_MODEL, "env.bin");
        let v = resolve_optional_string(Some("cli.bin".to_owned()), ENV_WHISPER_MODEL, &env);
        assert_eq!(v.as_deref(), Some("cli.bin"));
        let v = resolve_optional_string(None, ENV_WHISPER_MODEL, &env);
        assert_eq!(v.as_deref(), Some("env.bin"));
        let v = resolve_optional_string(None, ENV_WHISPER_MODEL, &MapEnv::default());
        assert!(v.is_none());
    }
}
