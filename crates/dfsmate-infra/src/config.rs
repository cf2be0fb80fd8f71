//! Configuration loading.
//!
//! Settings come from `config.toml` in the data directory, then environment
//! variables override individual fields. A missing or malformed file is not
//! an error: the defaults are usable out of the box against a local
//! `namenode` container.

use std::path::PathBuf;

use secrecy::SecretString;
use tracing::warn;

use dfsmate_types::config::{ExecConfig, Settings};
use dfsmate_types::error::ConfigError;

/// Data directory: `$DFSMATE_DATA_DIR`, or `~/.dfsmate`.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("DFSMATE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dfsmate")
}

/// Load settings from `config.toml`, apply env overrides, and clamp ranges.
pub fn load_settings() -> Settings {
    let path = data_dir().join("config.toml");
    let mut settings = match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str::<Settings>(&contents) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "malformed config.toml, using defaults");
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    };
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    clamp(&mut settings.exec);
    settings
}

/// Resolved audit log path: the configured one, or `<data_dir>/audit.log.jsonl`.
pub fn audit_log_path(settings: &Settings) -> PathBuf {
    settings
        .exec
        .audit_log
        .clone()
        .unwrap_or_else(|| data_dir().join("audit.log.jsonl"))
}

/// Validated credentials for the chat agent.
pub struct AgentSettings {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
}

/// Validate the agent section. Chat refuses to start without a plausible
/// key and a `provider/model` identifier; the tool surface has no such
/// requirement.
pub fn agent_settings(settings: &Settings) -> Result<AgentSettings, ConfigError> {
    let api_key = settings
        .agent
        .api_key
        .clone()
        .ok_or(ConfigError::MissingApiKey)?;
    if !api_key.starts_with("sk-") {
        return Err(ConfigError::InvalidApiKey);
    }
    let model = settings
        .agent
        .model
        .clone()
        .ok_or(ConfigError::MissingModel)?;
    if !model.contains('/') {
        return Err(ConfigError::InvalidModel(model));
    }
    Ok(AgentSettings {
        api_key: SecretString::from(api_key),
        model,
        base_url: settings.agent.base_url.clone(),
    })
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(container) = lookup("HDFS_NAMENODE_CONTAINER") {
        settings.exec.container = container;
    }
    if let Some(raw) = lookup("DFSMATE_TIMEOUT_SECS") {
        match raw.parse::<u64>() {
            Ok(secs) => settings.exec.timeout_secs = secs,
            Err(_) => warn!(value = %raw, "ignoring non-numeric DFSMATE_TIMEOUT_SECS"),
        }
    }
    if let Some(raw) = lookup("DFSMATE_RETRIES") {
        match raw.parse::<u32>() {
            Ok(retries) => settings.exec.retries = retries,
            Err(_) => warn!(value = %raw, "ignoring non-numeric DFSMATE_RETRIES"),
        }
    }
    if let Some(raw) = lookup("DFSMATE_STRICT_CONFIRM") {
        match parse_bool(&raw) {
            Some(strict) => settings.exec.strict_confirm = strict,
            None => warn!(value = %raw, "ignoring non-boolean DFSMATE_STRICT_CONFIRM"),
        }
    }
    if let Some(path) = lookup("DFSMATE_AUDIT_LOG") {
        settings.exec.audit_log = Some(PathBuf::from(path));
    }
    if let Some(key) = lookup("OPENROUTER_API_KEY") {
        settings.agent.api_key = Some(key);
    }
    if let Some(model) = lookup("OPENROUTER_MODEL") {
        settings.agent.model = Some(model);
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn clamp(exec: &mut ExecConfig) {
    let timeout = exec.timeout_secs.clamp(1, 600);
    if timeout != exec.timeout_secs {
        warn!(
            configured = exec.timeout_secs,
            clamped = timeout,
            "timeout_secs out of range (1..=600)"
        );
        exec.timeout_secs = timeout;
    }
    let retries = exec.retries.min(10);
    if retries != exec.retries {
        warn!(configured = exec.retries, clamped = retries, "retries out of range (0..=10)");
        exec.retries = retries;
    }
}
