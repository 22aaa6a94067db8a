use serde::Deserialize;

use crate::analytics::GoogleEndpoints;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Service account credentials and provider endpoints.
/// `account_id`, `client_email` and `private_key` may come from ACCOUNT_ID, CLIENT_EMAIL and PRIVATE_KEY.
#[derive(Clone, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_management_base_url")]
    pub management_base_url: String,
    #[serde(default = "default_reporting_base_url")]
    pub reporting_base_url: String,
    /// Per-request timeout for provider calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Keeps the private key out of logs.
impl std::fmt::Debug for AnalyticsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsConfig")
            .field("account_id", &self.account_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("management_base_url", &self.management_base_url)
            .field("reporting_base_url", &self.reporting_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AnalyticsConfig {
    pub fn endpoints(&self) -> GoogleEndpoints {
        GoogleEndpoints {
            management_base_url: self.management_base_url.trim_end_matches('/').to_string(),
            reporting_base_url: self.reporting_base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".into()
}

fn default_management_base_url() -> String {
    crate::analytics::GoogleEndpoints::default().management_base_url
}

fn default_reporting_base_url() -> String {
    crate::analytics::GoogleEndpoints::default().reporting_base_url
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> String {
    ".data/data.json".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Refetch today's sessions on every dashboard render.
    #[serde(default = "default_refresh_today_on_render")]
    pub refresh_today_on_render: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_today_on_render: default_refresh_today_on_render(),
        }
    }
}

fn default_refresh_today_on_render() -> bool {
    true
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        let mut config: AppConfig = toml::from_str(&s)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Credentials from the environment win over the file. PRIVATE_KEY may carry literal `\n`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty("ACCOUNT_ID") {
            self.analytics.account_id = v;
        }
        if let Some(v) = non_empty("CLIENT_EMAIL") {
            self.analytics.client_email = v;
        }
        if let Some(v) = non_empty("PRIVATE_KEY") {
            self.analytics.private_key = v.replace("\\n", "\n");
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            !self.analytics.account_id.trim().is_empty(),
            "analytics.account_id must be set (or ACCOUNT_ID)"
        );
        anyhow::ensure!(
            !self.analytics.client_email.trim().is_empty(),
            "analytics.client_email must be set (or CLIENT_EMAIL)"
        );
        anyhow::ensure!(
            !self.analytics.private_key.trim().is_empty(),
            "analytics.private_key must be set (or PRIVATE_KEY)"
        );
        for (key, url) in [
            ("analytics.token_url", &self.analytics.token_url),
            (
                "analytics.management_base_url",
                &self.analytics.management_base_url,
            ),
            (
                "analytics.reporting_base_url",
                &self.analytics.reporting_base_url,
            ),
        ] {
            anyhow::ensure!(
                url.starts_with("http://") || url.starts_with("https://"),
                "{} must be an http(s) URL, got {:?}",
                key,
                url
            );
        }
        anyhow::ensure!(
            self.analytics.request_timeout_secs > 0,
            "analytics.request_timeout_secs must be > 0, got {}",
            self.analytics.request_timeout_secs
        );
        anyhow::ensure!(!self.cache.path.is_empty(), "cache.path must be non-empty");
        Ok(())
    }
}
