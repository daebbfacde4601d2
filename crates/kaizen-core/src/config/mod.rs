mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::KaizenError;
use defaults::*;

/// Top-level service configuration. Built once at start and passed by
/// reference into every handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kaizen: KaizenConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub mailer: MailerConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KaizenConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for KaizenConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Shared secret expected in `x-cron-secret`. Empty = every gated request is rejected.
    #[serde(default)]
    pub cron_secret: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            cron_secret: String::new(),
        }
    }
}

/// Data store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Upper bound for a single query, in seconds.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

/// Email delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    #[serde(default = "default_mailer_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_resend_base_url")]
    pub base_url: String,
    /// Fixed sender, e.g. `Kaizen Focus <onboarding@resend.dev>`.
    #[serde(default = "default_from_address")]
    pub from: String,
    /// Public app URL used for call-to-action links.
    #[serde(default = "default_app_url")]
    pub app_url: String,
    #[serde(default = "default_mailer_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            provider: default_mailer_provider(),
            api_key: String::new(),
            base_url: default_resend_base_url(),
            from: default_from_address(),
            app_url: default_app_url(),
            timeout_secs: default_mailer_timeout_secs(),
        }
    }
}

/// Fan-out settings for the scanner and due-checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Items processed at once. 1 = strictly sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Overlay secrets and deployment-specific values from the environment.
///
/// `lookup` is `std::env::var` in production; tests pass a closure.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let pairs: [(&str, &mut String); 5] = [
        ("KAIZEN_CRON_SECRET", &mut config.api.cron_secret),
        ("RESEND_API_KEY", &mut config.mailer.api_key),
        ("KAIZEN_DB_PATH", &mut config.store.db_path),
        ("KAIZEN_APP_URL", &mut config.mailer.app_url),
        ("KAIZEN_MAIL_FROM", &mut config.mailer.from),
    ];
    for (key, slot) in pairs {
        if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
            info!("config: {key} set from environment");
            *slot = value;
        }
    }
}

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, KaizenError> {
    let mut config = read_file(path)?;
    apply_env_overrides(&mut config, |k| std::env::var(k).ok());
    validate(&config)?;
    Ok(config)
}

fn read_file(path: &str) -> Result<Config, KaizenError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| KaizenError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| KaizenError::Config(format!("failed to parse config: {}", e)))
}

/// Reject values the service cannot run with.
pub fn validate(config: &Config) -> Result<(), KaizenError> {
    if config.jobs.concurrency == 0 {
        return Err(KaizenError::Config(
            "jobs.concurrency must be at least 1".to_string(),
        ));
    }
    if config.mailer.timeout_secs == 0 || config.store.query_timeout_secs == 0 {
        return Err(KaizenError::Config(
            "timeouts must be at least 1 second".to_string(),
        ));
    }
    Ok(())
}
