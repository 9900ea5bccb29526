//! Configuration management for confmark.
//!
//! Parses `confmark.toml` with serde and discovers it in the current directory
//! or its parents. CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Every `[confluence]` string supports:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! ```toml
//! [confluence]
//! base_url = "https://acme.atlassian.net"
//! email = "${CONFLUENCE_EMAIL}"
//! api_token = "${CONFLUENCE_API_TOKEN}"
//! space_key = "ENG"
//!
//! [http]
//! timeout = 30
//! rate_limit_ms = 300
//!
//! [export]
//! output_dir = "docs"
//! assets_dir = "assets"
//! ```

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "confmark.toml";

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the export output directory.
    pub output_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection (optional section, validated on demand).
    pub confluence: Option<ConfluenceConfig>,
    /// HTTP behaviour.
    pub http: HttpConfig,
    /// Export configuration (paths as relative strings from TOML).
    export: ExportConfigRaw,

    /// Resolved export configuration (set after loading).
    #[serde(skip)]
    pub export_resolved: ExportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence Cloud connection settings.
#[derive(Debug, Deserialize)]
pub struct ConfluenceConfig {
    /// Site URL, e.g. `https://acme.atlassian.net`.
    pub base_url: String,
    /// Account email used for Basic auth.
    pub email: String,
    /// API token used for Basic auth.
    pub api_token: String,
    /// Space for new pages and title lookups.
    #[serde(default)]
    pub space_key: Option<String>,
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.email, "confluence.email")?;
        require_non_empty(&self.api_token, "confluence.api_token")?;
        if let Some(space_key) = &self.space_key {
            require_non_empty(space_key, "confluence.space_key")?;
        }
        Ok(())
    }

    /// Space key, required for creating pages.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `space_key` is not configured.
    pub fn require_space_key(&self) -> Result<&str, ConfigError> {
        self.space_key.as_deref().ok_or_else(|| {
            ConfigError::Validation("confluence.space_key is required to publish pages".to_owned())
        })
    }
}

/// HTTP configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Delay between consecutive uploads in milliseconds.
    pub rate_limit_ms: u64,
}

impl HttpConfig {
    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Delay between consecutive uploads.
    #[must_use]
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            rate_limit_ms: 300,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExportConfigRaw {
    output_dir: Option<String>,
    assets_dir: Option<String>,
}

/// Resolved export configuration.
#[derive(Debug, Default)]
pub struct ExportConfig {
    /// Directory that receives exported Markdown files.
    pub output_dir: PathBuf,
    /// Directory for downloaded media, relative to `output_dir` so that
    /// Markdown links stay relative.
    pub assets_dir: PathBuf,
}

impl ExportConfig {
    /// Absolute location of the assets directory.
    #[must_use]
    pub fn assets_path(&self) -> PathBuf {
        self.output_dir.join(&self.assets_dir)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_API_TOKEN`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `confmark.toml` in the current directory and its parents, falling
    /// back to defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or a referenced environment variable is unset.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.export_resolved.output_dir.clone_from(output_dir);
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation("[confluence] section required in config".into())
        })?;
        conf.validate()?;
        Ok(conf)
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        let mut config = Self::default();
        config.export_resolved = ExportConfig {
            output_dir: base.to_path_buf(),
            assets_dir: PathBuf::from("assets"),
        };
        config
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The `[confluence]` section is only checked by [`Config::require_confluence`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout == 0 {
            return Err(ConfigError::Validation(
                "http.timeout must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.email = expand::expand_env(&confluence.email, "confluence.email")?;
            confluence.api_token =
                expand::expand_env(&confluence.api_token, "confluence.api_token")?;
            if let Some(ref space_key) = confluence.space_key {
                confluence.space_key =
                    Some(expand::expand_env(space_key, "confluence.space_key")?);
            }
        }
        Ok(())
    }

    /// Resolve the output directory against the config file directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let assets_dir = PathBuf::from(self.export.assets_dir.as_deref().unwrap_or("assets"));
        if assets_dir.is_absolute() || assets_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "export.assets_dir must be a relative path".to_owned(),
            ));
        }

        self.export_resolved = ExportConfig {
            output_dir: config_dir.join(self.export.output_dir.as_deref().unwrap_or(".")),
            assets_dir,
        };
        Ok(())
    }
}
