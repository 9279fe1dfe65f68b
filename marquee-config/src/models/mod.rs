use anyhow::{Context, anyhow, ensure};
use marquee_core::StoreLimits;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use url::Url;

pub const CONFIG_PATH_VAR: &str = "MARQUEE_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "MARQUEE_CONFIG_JSON";
pub const DATA_DIR_VAR: &str = "MARQUEE_DATA_DIR";
pub const IDENTITY_URL_VAR: &str = "MARQUEE_IDENTITY_URL";

/// Files looked up in the working directory when no variable names one.
const DEFAULT_FILES: &[&str] =
    &["marquee.toml", "marquee.json", "config/marquee.toml"];

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

impl ConfigSource {
    /// First layer present: `$MARQUEE_CONFIG_PATH`, then
    /// `$MARQUEE_CONFIG_JSON`, then a default file, then built-in values.
    fn detect<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = non_blank(lookup(CONFIG_PATH_VAR)) {
            return Self::EnvPath(PathBuf::from(path));
        }
        if non_blank(lookup(CONFIG_JSON_VAR)).is_some() {
            return Self::EnvInline;
        }
        DEFAULT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
            .map_or(Self::Default, Self::File)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Disk,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory of the disk store
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Disk,
            data_dir: PathBuf::from(".marquee"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Base URL of the account service; `/users/login` and
    /// `/users/register` are resolved against it
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl IdentityConfig {
    pub fn url(&self) -> anyhow::Result<Url> {
        Url::parse(&self.base_url)
            .with_context(|| {
                format!("invalid identity base_url {:?}", self.base_url)
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    pub storage: StorageConfig,
    pub limits: StoreLimits,
    pub identity: IdentityConfig,
}

impl MarqueeConfig {
    /// Load configuration from the process environment.
    ///
    /// See [`MarqueeConfig::load_with`].
    pub fn load_from_env() -> anyhow::Result<(Self, ConfigSource)> {
        Self::load_with(|name| env::var(name).ok())
    }

    /// Resolve the first [`ConfigSource`] present, apply
    /// `$MARQUEE_DATA_DIR` and `$MARQUEE_IDENTITY_URL` on top and validate.
    /// Variables are read through `lookup`.
    pub fn load_with<F>(lookup: F) -> anyhow::Result<(Self, ConfigSource)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = ConfigSource::detect(&lookup);
        let mut config = match &source {
            ConfigSource::EnvPath(path) | ConfigSource::File(path) => {
                Self::load_from_file(path)?
            }
            ConfigSource::EnvInline => {
                let raw = lookup(CONFIG_JSON_VAR).unwrap_or_default();
                Self::parse(&raw, CONFIG_JSON_VAR)?
            }
            ConfigSource::Default => Self::default(),
        };
        config.apply_overrides(&lookup);
        config.validate()?;
        Ok((config, source))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read config from {}", path.display())
        })?;
        Self::parse(&contents, &path.display().to_string())
    }

    /// Parse TOML, or JSON when the text is not TOML. `origin` names the
    /// text in errors.
    pub fn parse(contents: &str, origin: &str) -> anyhow::Result<Self> {
        let toml_err = match toml::from_str(contents) {
            Ok(config) => return Ok(config),
            Err(err) => err,
        };
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!(
                "config {origin} is neither TOML ({toml_err}) nor JSON \
                 ({json_err})"
            )
        })
    }

    /// Apply single-value overrides looked up by variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = non_blank(lookup(DATA_DIR_VAR)) {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = non_blank(lookup(IDENTITY_URL_VAR)) {
            self.identity.base_url = url.trim().to_string();
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.limits.global_feed_limit > 0,
            "limits.global_feed_limit must be greater than zero"
        );
        ensure!(
            self.limits.notification_limit > 0,
            "limits.notification_limit must be greater than zero"
        );
        ensure!(
            self.limits.release_window_days > 0,
            "limits.release_window_days must be greater than zero"
        );
        ensure!(
            self.identity.timeout_secs > 0,
            "identity.timeout_secs must be greater than zero"
        );
        if self.storage.backend == StorageBackend::Disk {
            ensure!(
                !self.storage.data_dir.as_os_str().is_empty(),
                "storage.data_dir is required for the disk backend"
            );
        }
        self.identity.url()?;
        Ok(())
    }
}
