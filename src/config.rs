//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! Configuration is resolved once at startup. Endpoint URLs are required;
//! a missing URL is reported by [`Config::validate`] before any request is made.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::embed::EmbedRule;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub embed: EmbedConfig,

    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote endpoints used by the client
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    /// Company list endpoint (GET, JSON)
    pub companies_url: Option<String>,

    /// Logo upload endpoint (POST, multipart)
    pub upload_url: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            companies_url: None,
            upload_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Dashboard embedding rules
///
/// The viewer/embed segments encode the dashboard provider's URL convention,
/// so they live in configuration rather than code.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedConfig {
    #[serde(default = "default_viewer_segment")]
    pub viewer_segment: String,

    #[serde(default = "default_embed_segment")]
    pub embed_segment: String,

    #[serde(default = "default_embed_marker")]
    pub embed_marker: String,

    #[serde(default = "default_provider_domains")]
    pub provider_domains: Vec<String>,

    #[serde(default = "default_frame_title")]
    pub frame_title: String,

    #[serde(default = "default_external_link_label")]
    pub external_link_label: String,
}

fn default_viewer_segment() -> String {
    "/reporting/".to_string()
}

fn default_embed_segment() -> String {
    "/embed/reporting/".to_string()
}

fn default_embed_marker() -> String {
    "/embed/".to_string()
}

fn default_provider_domains() -> Vec<String> {
    vec![
        "lookerstudio.google.com".to_string(),
        "datastudio.google.com".to_string(),
    ]
}

fn default_frame_title() -> String {
    "Client dashboard".to_string()
}

fn default_external_link_label() -> String {
    "Open in Looker Studio".to_string()
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            viewer_segment: default_viewer_segment(),
            embed_segment: default_embed_segment(),
            embed_marker: default_embed_marker(),
            provider_domains: default_provider_domains(),
            frame_title: default_frame_title(),
            external_link_label: default_external_link_label(),
        }
    }
}

impl EmbedConfig {
    /// Build the URL rewrite rule described by this section
    pub fn rule(&self) -> Result<EmbedRule, ConfigError> {
        EmbedRule::new(&self.viewer_segment, &self.embed_segment, &self.embed_marker)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Viewport classification
#[derive(Debug, Clone, Deserialize)]
pub struct ViewportConfig {
    /// Widths strictly below this are "narrow" (sidebar collapses on select)
    #[serde(default = "default_narrow_breakpoint")]
    pub narrow_breakpoint_px: u32,

    /// Initial viewport width
    #[serde(default = "default_width")]
    pub width_px: u32,
}

fn default_narrow_breakpoint() -> u32 {
    600
}

fn default_width() -> u32 {
    1280
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            narrow_breakpoint_px: default_narrow_breakpoint(),
            width_px: default_width(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

/// Endpoints after validation; both URLs are guaranteed present
#[derive(Debug, Clone)]
pub struct ResolvedEndpoints {
    pub companies_url: String,
    pub upload_url: String,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("clientboard").join("config.toml")),
            Some(PathBuf::from("/etc/clientboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check startup invariants: endpoints present, embed rule consistent
    pub fn validate(&self) -> Result<ResolvedEndpoints, ConfigError> {
        self.embed.rule()?;
        self.resolve_endpoints()
    }

    /// Endpoint URLs, or `Missing` naming the first absent one
    pub fn resolve_endpoints(&self) -> Result<ResolvedEndpoints, ConfigError> {
        let companies_url = non_empty(&self.endpoints.companies_url)
            .ok_or(ConfigError::Missing("endpoints.companies_url"))?;
        let upload_url = non_empty(&self.endpoints.upload_url)
            .ok_or(ConfigError::Missing("endpoints.upload_url"))?;

        Ok(ResolvedEndpoints {
            companies_url,
            upload_url,
            request_timeout_secs: self.endpoints.request_timeout_secs,
        })
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CLIENTBOARD_COMPANIES_URL") {
            self.endpoints.companies_url = Some(url);
        }
        if let Ok(url) = std::env::var("CLIENTBOARD_UPLOAD_URL") {
            self.endpoints.upload_url = Some(url);
        }
        if let Ok(secs) = std::env::var("CLIENTBOARD_REQUEST_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse() {
                self.endpoints.request_timeout_secs = s;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("CLIENTBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CLIENTBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Clientboard Configuration
#
# Environment variables override these settings:
# - CLIENTBOARD_COMPANIES_URL
# - CLIENTBOARD_UPLOAD_URL
# - CLIENTBOARD_REQUEST_TIMEOUT_SECS
# - CLIENTBOARD_LOG_LEVEL
# - CLIENTBOARD_LOG_FORMAT

[endpoints]
# Company list endpoint (required)
companies_url = "https://example.com/companies"

# Logo upload endpoint (required)
upload_url = "https://example.com/upload-logo"

# Request timeout in seconds
request_timeout_secs = 30

[embed]
# Path segment of a shareable report link
viewer_segment = "/reporting/"

# Replacement segment that makes the link embeddable
embed_segment = "/embed/reporting/"

# Links containing this marker are already embeddable
embed_marker = "/embed/"

# Hosts whose policy violations mean the dashboard was blocked
provider_domains = ["lookerstudio.google.com", "datastudio.google.com"]

frame_title = "Client dashboard"
external_link_label = "Open in Looker Studio"

[viewport]
# Widths below this collapse the sidebar after a selection
narrow_breakpoint_px = 600
width_px = 1280

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/clientboard/clientboard.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_template_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let endpoints = config.validate().unwrap();
        assert_eq!(endpoints.companies_url, "https://example.com/companies");
        assert_eq!(endpoints.request_timeout_secs, 30);
        assert_eq!(config.embed.viewer_segment, "/reporting/");
        assert_eq!(config.viewport.narrow_breakpoint_px, 600);
    }

    #[test]
    fn test_missing_endpoint_is_startup_error() {
        let config = Config::parse("[endpoints]\nupload_url = \"http://u\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("endpoints.companies_url")));

        let config = Config::parse(
            "[endpoints]\ncompanies_url = \"http://c\"\nupload_url = \"  \"\n",
        )
        .unwrap();
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Missing("endpoints.upload_url")
        ));
    }

    #[test]
    fn test_inconsistent_embed_rule_rejected() {
        let config = Config::parse(
            r#"
[endpoints]
companies_url = "http://c"
upload_url = "http://u"

[embed]
embed_segment = "/frame/reporting/"
"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[endpoints]\ncompanies_url = \"http://c\"\nupload_url = \"http://u\"\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.embed.provider_domains.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/clientboard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
