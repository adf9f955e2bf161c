//! Configuration file management for careplan.
//!
//! Provides a TOML-based config file at `~/.config/careplan/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use careplan_core::{AgentConfig, ResourceTaxonomy};

pub const MODEL_ENV: &str = "CAREPLAN_MODEL";
pub const BASE_URL_ENV: &str = "CAREPLAN_BASE_URL";
pub const TAXONOMY_ENV: &str = "CAREPLAN_TAXONOMY";
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub resources: ResourcesSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Name of the environment variable holding the provider API key.
    pub api_key_env: String,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            model: AgentConfig::DEFAULT_MODEL.to_string(),
            base_url: AgentConfig::DEFAULT_BASE_URL.to_string(),
            temperature: AgentConfig::DEFAULT_TEMPERATURE,
            max_tokens: AgentConfig::DEFAULT_MAX_TOKENS,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcesSection {
    /// Optional replacement for the built-in taxonomy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_path: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the careplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/careplan` or `~/.config/careplan`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("careplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("careplan")
}

/// Return the path to the careplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line; they win over everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides<'a> {
    pub model: Option<&'a str>,
    pub bind: Option<&'a str>,
    pub port: Option<u16>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct CareplanConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub bind: String,
    pub port: u16,
    pub taxonomy_path: Option<PathBuf>,
}

impl CareplanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// A missing config file falls back to defaults; a malformed one is an error.
    pub fn resolve(overrides: Overrides<'_>) -> Result<Self> {
        let file_config = if config_path().exists() {
            load_config()?
        } else {
            ConfigFile::default()
        };
        Self::resolve_with(file_config, overrides)
    }

    /// Resolve against an already-loaded config file.
    pub fn resolve_with(file: ConfigFile, overrides: Overrides<'_>) -> Result<Self> {
        let model = match overrides.model {
            Some(m) => m.to_string(),
            None => env_or(MODEL_ENV, file.model.model),
        };
        let base_url = env_or(BASE_URL_ENV, file.model.base_url);

        let api_key_env = file.model.api_key_env;
        let api_key = std::env::var(&api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        let temperature = file.model.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            bail!("model.temperature must be between 0 and 2, got {temperature}");
        }
        let max_tokens = file.model.max_tokens;
        if max_tokens == 0 {
            bail!("model.max_tokens must be greater than 0");
        }

        let taxonomy_path = match std::env::var(TAXONOMY_ENV) {
            Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => file.resources.taxonomy_path,
        };

        Ok(Self {
            model,
            base_url,
            temperature,
            max_tokens,
            api_key_env,
            api_key,
            bind: overrides
                .bind
                .map(str::to_string)
                .unwrap_or(file.server.bind),
            port: overrides.port.unwrap_or(file.server.port),
            taxonomy_path,
        })
    }

    /// Build the agent settings. Fails when no API key is available.
    pub fn agent_config(&self) -> Result<AgentConfig> {
        let Some(api_key) = self.api_key.clone() else {
            bail!(
                "API key not found; set {} in the environment",
                self.api_key_env
            );
        };
        Ok(AgentConfig {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            api_key,
        })
    }

    /// Load the taxonomy once: the configured file, or the built-in one.
    pub fn taxonomy(&self) -> Result<Arc<ResourceTaxonomy>> {
        match &self.taxonomy_path {
            Some(path) => {
                let taxonomy = ResourceTaxonomy::load(path)
                    .with_context(|| format!("failed to load taxonomy {}", path.display()))?;
                Ok(Arc::new(taxonomy))
            }
            None => Ok(ResourceTaxonomy::builtin()),
        }
    }
}

fn env_or(var: &str, fallback: String) -> String {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => value,
        _ => fallback,
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
