/*!
common/src/lib.rs

Shared configuration, credential and record types for newsfeed.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader that merges a defaults file with an override file
- Environment credential loading (feed token + assistant key)
- The `Article` record persisted by the news store
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.default.toml";
pub const OVERRIDE_CONFIG_FILE: &str = "config.toml";

/// Description stored when a feed item carries none.
pub const NO_DESCRIPTION: &str = "No description";

/// Sensors polled when neither the config nor the CLI names any.
pub const DEFAULT_SENSORS: [&str; 2] = [
    "sensor.global_news_toronto_rest",
    "sensor.global_news_main_rest",
];

/// A single news item as persisted in the JSON store.
///
/// Field names serialize as `Published`, `Title`, `Description`, `Link`, in
/// that order, which is also the order used by the plain-text rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Article {
    /// Source timestamp string, kept exactly as the feed sent it.
    pub published: String,
    pub title: String,
    #[serde(default = "default_description", deserialize_with = "description_or_default")]
    pub description: String,
    pub link: String,
}

fn default_description() -> String {
    NO_DESCRIPTION.to_string()
}

// Files written by earlier tooling can carry `"Description": null`.
fn description_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_description))
}

impl Article {
    /// `(label, value)` pairs in persisted key order.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("Published", self.published.as_str()),
            ("Title", self.title.as_str()),
            ("Description", self.description.as_str()),
            ("Link", self.link.as_str()),
        ]
    }
}

/// Remote sensor (feed source) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Home Assistant base URL, e.g. "http://homeassistant.local:8123"
    pub base_url: String,
    /// Sensor entity ids fetched in order on every refresh
    pub sensors: Vec<String>,
    /// Whole-request timeout; the HTTP client default applies when unset
    pub timeout_seconds: Option<u64>,
    pub connect_timeout_seconds: Option<u64>,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8123".to_string(),
            sensors: DEFAULT_SENSORS.iter().map(|s| s.to_string()).collect(),
            timeout_seconds: None,
            connect_timeout_seconds: None,
            user_agent: concat!("newsfeed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Local JSON store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the news JSON file (e.g. "./news.json")
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "./news.json".to_string(),
        }
    }
}

/// Names of the environment variables holding the secrets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub feed_token_env: String,
    pub assistant_key_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            feed_token_env: "HA_TOKEN".to_string(),
            assistant_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub credentials: CredentialsConfig,
}

impl Config {
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(data).context("Failed to parse TOML configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence). Missing files
    /// are skipped, so with neither present the built-in defaults are returned.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for (kind, path) in [("default", default_path), ("override", override_path)] {
            let Some(path) = path else { continue };
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {} config: {}", kind, path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse {} configuration", kind))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve the config the binaries run with: `config.default.toml` in the
    /// working directory, overridden by `explicit` (which must exist) or else
    /// by `config.toml` when present.
    pub async fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        let override_path = match explicit {
            Some(p) if !p.exists() => anyhow::bail!("Config file not found: {}", p.display()),
            Some(p) => Some(p.to_path_buf()),
            None => Some(PathBuf::from(OVERRIDE_CONFIG_FILE)).filter(|p| p.exists()),
        };
        Self::load_with_defaults(Some(&default_path), override_path.as_deref()).await
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.base_url)
            .with_context(|| format!("Invalid source.base_url: {}", self.source.base_url))?;
        if self.store.path.trim().is_empty() {
            anyhow::bail!("store.path must not be empty");
        }
        Ok(())
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// A required secret was not present in the environment.
#[derive(Debug, thiserror::Error)]
#[error("{var} environment variable not found. {purpose} is required to run this application")]
pub struct CredentialMissing {
    pub var: String,
    pub purpose: &'static str,
}

/// Secrets handed to the core as opaque strings.
#[derive(Clone)]
pub struct Credentials {
    pub feed_token: String,
    pub assistant_key: String,
}

// Never print secrets through `{:?}`.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("feed_token", &"***")
            .field("assistant_key", &"***")
            .finish()
    }
}

impl Credentials {
    /// Read both secrets from the process environment.
    pub fn from_env(cfg: &CredentialsConfig) -> std::result::Result<Self, CredentialMissing> {
        Self::from_lookup(cfg, |name| std::env::var(name).ok())
    }

    /// Same as [`Credentials::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(cfg: &CredentialsConfig, lookup: F) -> std::result::Result<Self, CredentialMissing>
    where
        F: Fn(&str) -> Option<String>,
    {
        let feed_token = lookup_required(&lookup, &cfg.feed_token_env, "A Home Assistant Token")?;
        let assistant_key = lookup_required(&lookup, &cfg.assistant_key_env, "An OpenAI API Key")?;
        Ok(Self { feed_token, assistant_key })
    }
}

/// Read only the feed-source token, for callers that never talk to the assistant service.
pub fn feed_token_from_env(cfg: &CredentialsConfig) -> std::result::Result<String, CredentialMissing> {
    lookup_required(&|name: &str| std::env::var(name).ok(), &cfg.feed_token_env, "A Home Assistant Token")
}

fn lookup_required<F>(lookup: &F, var: &str, purpose: &'static str) -> std::result::Result<String, CredentialMissing>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).ok_or_else(|| CredentialMissing {
        var: var.to_string(),
        purpose,
    })
}
