//! Configuration types for dfsmate.
//!
//! [`Settings`] is the shape of `config.toml` in the data directory
//! (`~/.dfsmate` by default). All fields have serde defaults so a missing
//! or partial file degrades gracefully; range clamping and env overrides
//! happen in the infra loader.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default base URL for the OpenRouter chat-completion API.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Top-level `config.toml` contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Settings for the command executor and audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecConfig {
    /// Name of the namenode container commands are exec'd into.
    #[serde(default = "default_container")]
    pub container: String,

    /// Hard timeout per execution attempt, in seconds (clamped to 1..=600).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt, on timeout/OS error only
    /// (clamped to 0..=10).
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// When true, mkdir also requires confirm=true.
    #[serde(default = "default_strict_confirm")]
    pub strict_confirm: bool,

    /// Audit log path; defaults to `<data_dir>/audit.log.jsonl`.
    #[serde(default)]
    pub audit_log: Option<PathBuf>,
}

fn default_container() -> String {
    "namenode".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_retries() -> u32 {
    2
}

fn default_strict_confirm() -> bool {
    true
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            container: default_container(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            strict_confirm: default_strict_confirm(),
            audit_log: None,
        }
    }
}

/// Settings for the chat agent. The API key and model usually come from the
/// `OPENROUTER_API_KEY` / `OPENROUTER_MODEL` environment variables, which
/// override whatever the file says.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier in `provider/model` form, e.g. `openai/gpt-4o-mini`.
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            base_url: default_base_url(),
        }
    }
}
