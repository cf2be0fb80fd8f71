//! Shared application state: loaded settings and factories for the tool
//! surface components.

use anyhow::Context;

use dfsmate_core::tool::Toolbox;
use dfsmate_infra::audit::JsonlAuditSink;
use dfsmate_infra::config::{self, AgentSettings};
use dfsmate_infra::exec::DockerExecRunner;
use dfsmate_types::config::Settings;

pub struct AppState {
    pub settings: Settings,
}

impl AppState {
    pub fn init() -> Self {
        Self {
            settings: config::load_settings(),
        }
    }

    pub fn runner(&self) -> DockerExecRunner {
        DockerExecRunner::new(
            self.settings.exec.container.clone(),
            self.settings.exec.timeout_secs,
            self.settings.exec.retries,
        )
    }

    pub async fn audit_sink(&self) -> anyhow::Result<JsonlAuditSink> {
        let path = config::audit_log_path(&self.settings);
        JsonlAuditSink::open(&path)
            .await
            .with_context(|| format!("failed to open audit log at {}", path.display()))
    }

    /// Build the full tool surface against the configured container.
    pub async fn toolbox(&self) -> anyhow::Result<Toolbox<DockerExecRunner, JsonlAuditSink>> {
        Ok(Toolbox::new(
            self.runner(),
            self.audit_sink().await?,
            self.settings.exec.strict_confirm,
        ))
    }

    pub fn agent_settings(&self) -> anyhow::Result<AgentSettings> {
        config::agent_settings(&self.settings).map_err(Into::into)
    }
}
