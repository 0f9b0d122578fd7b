use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const FILENAME: &str = "config.toml";

/// Client settings stored in `~/.config/cfgctl/config.toml`.
///
/// ```toml
/// api_origin = "https://control.cfgctl.dev"
/// service_token = "sk_..."
/// environment = "development"
/// timeout_secs = 15
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the management API.
    #[serde(default = "default_api_origin")]
    pub api_origin: String,

    /// Bearer token for the management API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,

    /// Environment used when neither `--branch` nor an active branch applies.
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_origin() -> String {
    "https://control.cfgctl.dev".into()
}

fn default_environment() -> String {
    "development".into()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_origin: default_api_origin(),
            service_token: None,
            environment: default_environment(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load the config from `explicit`, `$CFGCTL_CONFIG`, or the user config
    /// directory, then apply `CFGCTL_*` environment overrides.
    ///
    /// A missing file yields defaults. Missing keys in an existing file are
    /// filled in with defaults via serde.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os("CFGCTL_CONFIG").map(PathBuf::from))
            .or_else(default_path);
        let mut config = match path {
            Some(path) => Self::load_file(&path)?,
            None => Config::default(),
        };
        config.apply_env(|name| env::var(name).ok());
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(origin) = var("CFGCTL_API_ORIGIN") {
            self.api_origin = origin;
        }
        if let Some(token) = var("CFGCTL_SERVICE_TOKEN") {
            self.service_token = Some(token);
        }
        if let Some(environment) = var("CFGCTL_ENVIRONMENT") {
            self.environment = environment;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_path() -> Option<PathBuf> {
    let base = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("cfgctl").join(FILENAME))
}
