//! Runtime configuration.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config PATH`, else `<config dir>/comps/config.toml` if present)
//! 3. environment variables, after loading a `.env` file if one exists
//! 4. command-line flags, applied by the binary
//!
//! | variable | field |
//! |----------|-------|
//! | `GOOGLE_API_KEY` or `GEMINI_API_KEY` | `google_api_key` |
//! | `COMPS_EDGAR_IDENTITY` | `edgar_identity` |
//! | `COMPS_MODEL` | `model` |

use crate::error::{CompsError, Result};
use comps_data::gemini::DEFAULT_MODEL;
use comps_valuation::extract::DEFAULT_MAX_PROMPT_CHARS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// SEC's published fair-access ceiling.
const SEC_MAX_REQUESTS_PER_SECOND: u32 = 10;

const DEFAULT_COMPANY_DELAY_SECS: u64 = 10;

/// Settings for a comps run.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompsConfig {
    /// User-Agent identity sent to SEC EDGAR ("Name email@example.com")
    pub edgar_identity: Option<String>,
    /// Gemini API key
    pub google_api_key: Option<String>,
    /// Gemini model name
    pub model: String,
    /// Characters of filing text sent per prompt
    pub max_prompt_chars: usize,
    /// Companies valued at once
    pub concurrency: usize,
    /// Pause before each company after the first; unset means 10 s when
    /// sequential and none when concurrent
    pub company_delay_secs: Option<u64>,
    /// Wait after a rate-limit response before retrying
    pub rate_limit_backoff_secs: u64,
    /// Attempts per company step when rate limited
    pub max_attempts: u32,
    /// EDGAR request ceiling
    pub edgar_requests_per_second: u32,
}

impl Default for CompsConfig {
    fn default() -> Self {
        Self {
            edgar_identity: None,
            google_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            concurrency: 1,
            company_delay_secs: None,
            rate_limit_backoff_secs: 20,
            max_attempts: 2,
            edgar_requests_per_second: SEC_MAX_REQUESTS_PER_SECOND,
        }
    }
}

impl fmt::Debug for CompsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompsConfig")
            .field("edgar_identity", &self.edgar_identity)
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("model", &self.model)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .field("concurrency", &self.concurrency)
            .field("company_delay_secs", &self.company_delay_secs)
            .field("rate_limit_backoff_secs", &self.rate_limit_backoff_secs)
            .field("max_attempts", &self.max_attempts)
            .field("edgar_requests_per_second", &self.edgar_requests_per_second)
            .finish()
    }
}

impl CompsConfig {
    /// Load defaults, the config file and the process environment.
    ///
    /// An explicit `path` must exist; the default location is optional.
    ///
    /// # Errors
    /// Returns [`CompsError::ConfigRead`] or [`CompsError::ConfigParse`] for a
    /// bad file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // A missing .env is normal
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "loaded .env");
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a TOML file over the defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CompsError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text)
    }

    /// Parse TOML over the defaults.
    ///
    /// # Errors
    /// Returns [`CompsError::ConfigParse`] for invalid TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from environment variables, read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GOOGLE_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")) {
            self.google_api_key = Some(key.trim().to_string());
        }
        if let Some(identity) = non_empty("COMPS_EDGAR_IDENTITY") {
            self.edgar_identity = Some(identity.trim().to_string());
        }
        if let Some(model) = non_empty("COMPS_MODEL") {
            self.model = model.trim().to_string();
        }
    }

    /// Check the settings a command relies on.
    ///
    /// `needs_model` is false for commands that never call the language model.
    ///
    /// # Errors
    /// Returns [`CompsError::Config`] naming the first problem found.
    pub fn validate(&self, needs_model: bool) -> Result<()> {
        if self.concurrency == 0 {
            return Err(CompsError::Config("concurrency must be at least 1".into()));
        }
        if self.max_attempts == 0 {
            return Err(CompsError::Config("max_attempts must be at least 1".into()));
        }
        if self.max_prompt_chars == 0 {
            return Err(CompsError::Config("max_prompt_chars must be positive".into()));
        }
        if !(1..=SEC_MAX_REQUESTS_PER_SECOND).contains(&self.edgar_requests_per_second) {
            return Err(CompsError::Config(format!(
                "edgar_requests_per_second must be between 1 and {SEC_MAX_REQUESTS_PER_SECOND}"
            )));
        }
        if self.model.trim().is_empty() {
            return Err(CompsError::Config("model must not be empty".into()));
        }
        if needs_model && self.google_api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            return Err(CompsError::Config(
                "Google API key missing: set GOOGLE_API_KEY in the environment or .env".into(),
            ));
        }
        Ok(())
    }

    /// EDGAR identity, required for every filing request.
    ///
    /// # Errors
    /// Returns [`CompsError::Config`] when unset.
    pub fn require_edgar_identity(&self) -> Result<&str> {
        self.edgar_identity
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .ok_or_else(|| {
                CompsError::Config(
                    "EDGAR identity missing: set COMPS_EDGAR_IDENTITY to \"Name email@example.com\""
                        .into(),
                )
            })
    }

    /// Pause before each company after the first.
    pub const fn company_delay(&self) -> Duration {
        match self.company_delay_secs {
            Some(secs) => Duration::from_secs(secs),
            None if self.concurrency > 1 => Duration::ZERO,
            None => Duration::from_secs(DEFAULT_COMPANY_DELAY_SECS),
        }
    }

    /// Wait after a rate-limit response.
    pub const fn rate_limit_backoff(&self) -> Duration {
        Duration::from_secs(self.rate_limit_backoff_secs)
    }

    /// Minimum spacing between EDGAR requests.
    pub fn edgar_interval(&self) -> Duration {
        Duration::from_secs(1) / self.edgar_requests_per_second.max(1)
    }
}

/// `<config dir>/comps/config.toml`, when the platform has a config directory.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("comps").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CompsConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.company_delay(), Duration::from_secs(10));
        assert_eq!(config.rate_limit_backoff(), Duration::from_secs(20));
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.edgar_interval(), Duration::from_millis(100));
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = CompsConfig::from_toml_str(
            r#"
            edgar_identity = "Jane Analyst jane@example.com"
            concurrency = 3
            company_delay_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.company_delay(), Duration::ZERO);
        assert_eq!(config.max_attempts, 2);
        assert_eq!(
            config.require_edgar_identity().unwrap(),
            "Jane Analyst jane@example.com"
        );
    }

    #[test]
    fn test_concurrent_runs_default_to_no_delay() {
        let config = CompsConfig::from_toml_str("concurrency = 4").unwrap();
        assert_eq!(config.company_delay(), Duration::ZERO);

        let config = CompsConfig::from_toml_str("concurrency = 4\ncompany_delay_secs = 2").unwrap();
        assert_eq!(config.company_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            CompsConfig::from_toml_str("concurency = 3"),
            Err(CompsError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = CompsConfig::from_file(Path::new("/nonexistent/comps.toml")).unwrap_err();
        assert!(matches!(err, CompsError::ConfigRead { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CompsConfig::from_toml_str(r#"model = "gemini-1.5-pro""#).unwrap();
        config.apply_env(env(&[
            ("GEMINI_API_KEY", " secret "),
            ("COMPS_EDGAR_IDENTITY", "Ops ops@example.com"),
            ("COMPS_MODEL", ""),
        ]));
        assert_eq!(config.google_api_key.as_deref(), Some("secret"));
        assert_eq!(config.edgar_identity.as_deref(), Some("Ops ops@example.com"));
        // Empty variables do not override
        assert_eq!(config.model, "gemini-1.5-pro");

        config.apply_env(env(&[("GOOGLE_API_KEY", "primary"), ("GEMINI_API_KEY", "other")]));
        assert_eq!(config.google_api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_api_key_redacted() {
        let config = CompsConfig {
            google_api_key: Some("AIza-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("AIza-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[rstest]
    #[case("concurrency = 0", "concurrency")]
    #[case("max_attempts = 0", "max_attempts")]
    #[case("edgar_requests_per_second = 11", "edgar_requests_per_second")]
    #[case(r#"model = " ""#, "model")]
    fn test_validate_rejects(#[case] toml: &str, #[case] field: &str) {
        let config = CompsConfig::from_toml_str(toml).unwrap();
        match config.validate(false) {
            Err(CompsError::Config(message)) => assert!(message.contains(field)),
            other => panic!("expected config error for {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_requires_key_for_model() {
        let config = CompsConfig::default();
        assert!(config.validate(true).is_err());
        assert!(config.require_edgar_identity().is_err());

        let config = CompsConfig {
            google_api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(config.validate(true).is_ok());
    }
}
