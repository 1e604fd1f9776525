//! Configuration management for the jzip CLI and SDK

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{JzipError, Result};
use crate::ui::UI;
use crate::validation::DEFAULT_MAX_FILE_SIZE;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3001/api";

fn default_timeout() -> u64 {
    30
}

fn default_use_proxy() -> bool {
    true
}

/// Tool-level configuration persisted under the platform config directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    pub endpoint: String,
    pub timeout: u64,
    pub verbose: bool,
    pub download_dir: PathBuf,
    pub max_file_size: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: default_timeout(),
            verbose: false,
            download_dir: default_download_dir(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ToolConfig {
    /// Load the tool configuration, creating a default one when missing
    /// or unreadable
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => default_config_path(),
        };

        if config_file.exists() {
            let content = fs::read_to_string(&config_file).await?;

            match serde_json::from_str::<Self>(&content) {
                Ok(config) => Ok(config),
                Err(_) => {
                    let config = Self::default();
                    config.save(&config_file).await?;
                    Ok(config)
                }
            }
        } else {
            let config = Self::default();
            config.save(&config_file).await?;
            Ok(config)
        }
    }

    pub async fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content).await?;
        Ok(())
    }

    /// Derive the SDK client configuration from the tool configuration
    ///
    /// A stored non-default endpoint wins; otherwise `JZIP_BASE_URL` from the
    /// environment applies, then the built-in default. Proxying is skipped
    /// for local endpoints.
    pub fn to_client_config(&self) -> Result<ClientConfig> {
        let normalized_endpoint = if self.endpoint.ends_with("/api") {
            self.endpoint.clone()
        } else if self.endpoint.ends_with('/') {
            format!("{}api", self.endpoint)
        } else {
            format!("{}/api", self.endpoint)
        };

        let mut builder = ClientConfig::builder()
            .timeout(self.timeout)
            .verbose(self.verbose);
        if normalized_endpoint != DEFAULT_ENDPOINT {
            builder = builder.base_url(normalized_endpoint);
        }

        let mut config = builder.build()?;
        config.use_proxy = !config.base_url.contains("localhost")
            && !config.base_url.contains("127.0.0.1");
        Ok(config)
    }
}

pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jzip")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default = "default_use_proxy")]
    pub use_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENDPOINT.to_string(),
            timeout: default_timeout(),
            verbose: false,
            use_proxy: default_use_proxy(),
        }
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    timeout: Option<u64>,
    verbose: Option<bool>,
    use_proxy: Option<bool>,
    config_file: Option<PathBuf>,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn use_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = Some(use_proxy);
        self
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        let mut config = ClientConfig::from_file_and_env(self.config_file.as_deref())?;

        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(verbose) = self.verbose {
            config.verbose = verbose;
        }
        if let Some(use_proxy) = self.use_proxy {
            config.use_proxy = use_proxy;
        }

        config.validate()?;
        Ok(config)
    }
}

impl ClientConfig {
    pub fn new() -> Result<Self> {
        Self::from_file_and_env::<&str>(None)
    }

    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Layer defaults, an optional config file, and `JZIP_*` environment
    /// variables into a client configuration
    pub fn from_file_and_env<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("base_url", DEFAULT_ENDPOINT)?
            .set_default("timeout", 30)?
            .set_default("verbose", false)?
            .set_default("use_proxy", true)?;

        if let Some(config_path) = config_file {
            if config_path.as_ref().exists() {
                builder = builder.add_source(File::from(config_path.as_ref()));
            }
        }
        builder = builder.add_source(Environment::with_prefix("JZIP").try_parsing(true));

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(JzipError::invalid_endpoint("Base URL cannot be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(JzipError::invalid_endpoint(format!(
                "Base URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        Ok(())
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}

/// Handler for the `config` subcommand
pub struct ConfigService {
    config: ToolConfig,
    config_path: PathBuf,
    ui: UI,
}

impl ConfigService {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            config_path: default_config_path(),
            ui: UI::new(),
        }
    }

    pub fn with_config_path(config: ToolConfig, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
            ui: UI::new(),
        }
    }

    pub async fn handle_config(&mut self, args: crate::cli::ConfigArgs) -> Result<()> {
        use crate::cli::ConfigCommand;

        match args.command {
            ConfigCommand::Show => {
                self.ui.card(
                    "Configuration",
                    vec![
                        ("Version", crate::version::format_version_info()),
                        ("Endpoint", self.config.endpoint.clone()),
                        ("Timeout", format!("{}s", self.config.timeout)),
                        ("Verbose", self.config.verbose.to_string()),
                        (
                            "Download dir",
                            self.config.download_dir.display().to_string(),
                        ),
                        (
                            "Max file size",
                            crate::utils::format_file_size(self.config.max_file_size),
                        ),
                    ],
                );
                Ok(())
            }
            ConfigCommand::SetEndpoint { url } => {
                let probe = ClientConfig {
                    base_url: url.clone(),
                    ..ClientConfig::default()
                };
                probe.validate()?;
                self.config.endpoint = url;
                self.persist("Endpoint updated").await
            }
            ConfigCommand::SetTimeout { seconds } => {
                if seconds == 0 {
                    return Err(JzipError::invalid_input("Timeout must be at least 1 second"));
                }
                self.config.timeout = seconds;
                self.persist("Timeout updated").await
            }
            ConfigCommand::SetVerbose { enabled } => {
                self.config.verbose = match enabled.to_lowercase().as_str() {
                    "true" | "on" | "1" => true,
                    "false" | "off" | "0" => false,
                    other => {
                        return Err(JzipError::invalid_input(format!(
                            "Expected true or false, got '{}'",
                            other
                        )))
                    }
                };
                self.persist("Verbose updated").await
            }
            ConfigCommand::SetDownloadDir { path } => {
                self.config.download_dir = PathBuf::from(path);
                self.persist("Download directory updated").await
            }
            ConfigCommand::Reset => {
                self.config = ToolConfig::default();
                self.persist("Configuration reset to defaults").await
            }
        }
    }

    async fn persist(&self, message: &str) -> Result<()> {
        self.config.save(&self.config_path).await?;
        self.ui.success(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::test_helpers::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:3001/api");
        assert_eq!(config.timeout, 30);
        assert!(config.use_proxy);
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = ClientConfig::default();
        config.base_url = String::new();
        assert!(config.validate().is_err());

        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.base_url = "https://converter.example.com/api".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoint_url_joining() {
        let config = ClientConfig::default();
        assert_eq!(
            config.endpoint_url("/convert/json-to-zip"),
            "http://localhost:3001/api/convert/json-to-zip"
        );
        assert_eq!(
            config.endpoint_url("formats"),
            "http://localhost:3001/api/formats"
        );
    }

    #[test]
    fn test_tool_config_normalizes_endpoint() {
        let mut tool = ToolConfig::default();
        tool.endpoint = "http://localhost:3001".to_string();
        assert_eq!(
            tool.to_client_config().unwrap().base_url,
            "http://localhost:3001/api"
        );

        tool.endpoint = "http://localhost:3001/".to_string();
        assert_eq!(
            tool.to_client_config().unwrap().base_url,
            "http://localhost:3001/api"
        );

        tool.endpoint = "http://localhost:3001/api".to_string();
        assert_eq!(
            tool.to_client_config().unwrap().base_url,
            "http://localhost:3001/api"
        );
    }

    #[test]
    fn test_proxy_disabled_for_localhost() {
        let tool = ToolConfig::default();
        assert!(!tool.to_client_config().unwrap().use_proxy);

        let mut remote = ToolConfig::default();
        remote.endpoint = "https://converter.example.com/api".to_string();
        assert!(remote.to_client_config().unwrap().use_proxy);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::builder()
            .base_url("https://converter.example.com/api")
            .timeout(5)
            .use_proxy(false)
            .build()
            .unwrap();
        assert_eq!(config.base_url, "https://converter.example.com/api");
        assert_eq!(config.timeout, 5);
        assert!(!config.use_proxy);
    }

    #[tokio::test]
    async fn test_tool_config_round_trip() {
        let temp_dir = create_temp_dir();
        let path = temp_dir.path().join("config.json");

        let mut config = ToolConfig::default();
        config.timeout = 45;
        config.save(&path).await.unwrap();

        let loaded = ToolConfig::load(Some(path.as_path())).await.unwrap();
        assert_eq!(loaded.timeout, 45);
        assert_eq!(loaded.endpoint, DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_tool_config_load_creates_default() {
        let temp_dir = create_temp_dir();
        let path = temp_dir.path().join("missing/config.json");

        let loaded = ToolConfig::load(Some(path.as_path())).await.unwrap();
        assert_eq!(loaded.endpoint, DEFAULT_ENDPOINT);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_tool_config_recovers_from_corrupt_file() {
        let temp_dir = create_temp_dir();
        let path = create_temp_file_with_content(&temp_dir, "config.json", b"{not json");

        let loaded = ToolConfig::load(Some(path.as_path())).await.unwrap();
        assert_eq!(loaded.endpoint, DEFAULT_ENDPOINT);
    }
}
