//! Client configuration
//!
//! A YAML file describing how to reach the service:
//!
//! ```yaml
//! base_url: https://api.elliemae.com
//! timeout_seconds: 30
//! max_retries: 3
//! retry_backoff:
//!   type: exponential
//!   initial_ms: 100
//!   max_ms: 60000
//! rate_limit:
//!   requests_per_second: 10
//!   burst_size: 10
//! headers:
//!   Authorization: "Bearer ${ENCOMPASS_TOKEN}"
//! ```
//!
//! `${VAR}` references in header values are expanded from the environment
//! when the HTTP configuration is built.

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::BackoffType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Regex for environment references: ${NAME}
static ENV_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").unwrap());

// ============================================================================
// Client Config
// ============================================================================

/// Connection settings for the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for API requests
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting; omitted or null disables it
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: None,
            headers: BTreeMap::new(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

impl ClientConfig {
    /// Load a config from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("loading {}", path.display()))
    }

    /// Parse a config from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but make no sense
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.base_url {
            url::Url::parse(url)?;
        }
        if self.timeout_seconds == 0 {
            return Err(Error::config("timeout_seconds must be greater than 0"));
        }
        if self.retry_backoff.initial_ms > self.retry_backoff.max_ms {
            return Err(Error::config(
                "retry_backoff.initial_ms must not exceed retry_backoff.max_ms",
            ));
        }
        Ok(())
    }

    /// Build the HTTP client configuration, expanding `${VAR}` in headers
    pub fn to_http_config(&self) -> Result<HttpClientConfig> {
        self.to_http_config_with(|name| std::env::var(name).ok())
    }

    /// Same as [`to_http_config`](Self::to_http_config) with a custom variable lookup
    pub fn to_http_config_with<F>(&self, lookup: F) -> Result<HttpClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_seconds))
            .max_retries(self.max_retries)
            .backoff(
                self.retry_backoff.backoff_type,
                Duration::from_millis(self.retry_backoff.initial_ms),
                Duration::from_millis(self.retry_backoff.max_ms),
            );

        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        builder = match &self.rate_limit {
            Some(limit) => builder.rate_limit(limit.clone()),
            None => builder.no_rate_limit(),
        };
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, expand_env(value, &lookup)?);
        }

        Ok(builder.build())
    }
}

/// Replace every `${NAME}` with the looked-up value
fn expand_env<F>(value: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(value.len());
    let mut last = 0;

    for caps in ENV_REGEX.captures_iter(value) {
        let whole = caps.get(0).ok_or_else(|| Error::config("bad env match"))?;
        let name = &caps[1];
        let replacement = lookup(name)
            .ok_or_else(|| Error::config(format!("environment variable '{name}' is not set")))?;
        result.push_str(&value[last..whole.start()]);
        result.push_str(&replacement);
        last = whole.end();
    }
    result.push_str(&value[last..]);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn vars(name: &str) -> Option<String> {
        match name {
            "TOKEN" => Some("s3cret".to_string()),
            "INSTANCE" => Some("BE1234".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = ClientConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_backoff, BackoffConfig::default());
        assert!(config.rate_limit.is_none());
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
base_url: https://api.example.com
timeout_seconds: 10
max_retries: 1
retry_backoff:
  type: linear
  initial_ms: 50
  max_ms: 500
rate_limit:
  requests_per_second: 5
  burst_size: 2
headers:
  Authorization: "Bearer ${TOKEN}"
user_agent: pipeline-export/2.0
"#;
        let config = ClientConfig::from_yaml_str(yaml).unwrap();
        let http = config.to_http_config_with(vars).unwrap();

        assert_eq!(http.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(http.timeout, Duration::from_secs(10));
        assert_eq!(http.max_retries, 1);
        assert_eq!(http.backoff_type, BackoffType::Linear);
        assert_eq!(http.initial_backoff, Duration::from_millis(50));
        assert_eq!(http.max_backoff, Duration::from_millis(500));
        assert_eq!(http.rate_limit, Some(RateLimiterConfig::new(5, 2)));
        assert_eq!(
            http.default_headers.get("Authorization"),
            Some(&"Bearer s3cret".to_string())
        );
        assert_eq!(http.user_agent, "pipeline-export/2.0");
    }

    #[test]
    fn test_expand_env() {
        assert_eq!(expand_env("plain", &vars).unwrap(), "plain");
        assert_eq!(
            expand_env("${INSTANCE}:${ TOKEN }!", &vars).unwrap(),
            "BE1234:s3cret!"
        );

        let err = expand_env("${MISSING}", &vars).unwrap_err();
        assert!(err.to_string().contains("MISSING"));
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            ClientConfig::from_yaml_str("base_url: not a url"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            ClientConfig::from_yaml_str("timeout_seconds: 0"),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            ClientConfig::from_yaml_str("retry_backoff: { initial_ms: 10, max_ms: 1 }"),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            ClientConfig::from_yaml_str("max_retries: [1]"),
            Err(Error::YamlParse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: https://api.example.com").unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://api.example.com"));

        assert!(matches!(
            ClientConfig::load("/nonexistent/client.yaml"),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load(dir.path()).unwrap_err();
        assert!(err
            .to_string()
            .starts_with(&format!("reading {}", dir.path().display())));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_seconds: 0").unwrap();
        let err = ClientConfig::load(file.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with(&format!("loading {}", file.path().display())));
        assert!(message.contains("timeout_seconds must be greater than 0"));
    }
}
