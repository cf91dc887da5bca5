//! Loader for croscan configuration with YAML + environment overlays.
//!
//! Sources are merged in order: an optional YAML file, then
//! `CROSCAN__SECTION__KEY` environment variables. `${VAR}` placeholders in
//! string values are expanded afterwards. Every field has a default, so an
//! empty configuration is valid:
//!
//! ```yaml
//! server:  { host: 127.0.0.1, port: 8000 }
//! fetch:   { user_agent: "Mozilla/5.0", timeout_secs: 20, status_policy: ok_only }
//! llm:     { provider: ollama, endpoint: "http://localhost:11434", model: "llama3.1:8b" }
//! output:  { path: result.json }
//! logging: { format: text, filter: info }
//! ```
use config::{Config, Environment, File};
use croscan_common::StatusPolicy;
use croscan_common::observability::LogFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_CONFIG_FILE: &str = "croscan.yaml";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_PULL_TIMEOUT_SECS: u64 = 30 * 60;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CroscanConfig {
    pub server: ServerSettings,
    pub fetch: FetchSettings,
    pub llm: LlmSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub status_policy: StatusPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            status_policy: StatusPolicy::default(),
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Ollama,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub endpoint: String,
    pub model: String,
    pub connect_timeout_secs: u64,
    /// No timeout when unset; a stalled model server blocks the request.
    pub request_timeout_secs: Option<u64>,
    pub pull_if_missing: bool,
    /// Upper bound on a model download triggered by `pull_if_missing`.
    pub pull_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: DEFAULT_OLLAMA_ENDPOINT.into(),
            model: DEFAULT_OLLAMA_MODEL.into(),
            connect_timeout_secs: 10,
            request_timeout_secs: None,
            pull_if_missing: false,
            pull_timeout_secs: DEFAULT_PULL_TIMEOUT_SECS,
        }
    }
}

impl LlmSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn pull_timeout(&self) -> Duration {
        Duration::from_secs(self.pull_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub path: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("result.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            filter: "info".into(),
        }
    }
}

impl CroscanConfig {
    /// Reject values that would only fail later, at request time.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.llm.model.trim().is_empty() {
            return Err(SettingsError::Invalid("llm.model must not be empty".into()));
        }
        if !(self.llm.endpoint.starts_with("http://") || self.llm.endpoint.starts_with("https://"))
        {
            return Err(SettingsError::Invalid(format!(
                "llm.endpoint must be an http(s) URL, got `{}`",
                self.llm.endpoint
            )));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "fetch.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.llm.pull_timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "llm.pull_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "fetch.user_agent must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Look for `croscan.yaml` in the working directory, then in the user config
/// directory (`~/.config/croscan/croscan.yaml` on Linux).
pub fn discover_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("croscan").join(DEFAULT_CONFIG_FILE))
        .filter(|p| p.is_file())
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct CroscanConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CroscanConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CroscanConfigLoader {
    /// Start from defaults with no file attached.
    ///
    /// ```
    /// use croscan_config::CroscanConfigLoader;
    ///
    /// let config = CroscanConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(config.llm.model, "llama3.1:8b");
    /// assert_eq!(config.fetch.timeout_secs, 20);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use croscan_common::StatusPolicy;
    /// use croscan_config::CroscanConfigLoader;
    ///
    /// let cfg = CroscanConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// fetch:
    ///   status_policy: success
    /// llm:
    ///   model: "qwen2.5:7b"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.fetch.status_policy, StatusPolicy::Success);
    /// assert_eq!(cfg.llm.model, "qwen2.5:7b");
    /// assert_eq!(cfg.llm.endpoint, "http://localhost:11434");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge sources, apply `CROSCAN__` env overrides, expand `${VAR}`
    /// placeholders, and validate.
    pub fn load(self) -> Result<CroscanConfig, SettingsError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("CROSCAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: CroscanConfig = serde_json::from_value(v)
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}
