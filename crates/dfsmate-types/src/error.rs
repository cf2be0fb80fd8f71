use thiserror::Error;

/// Errors from the command-execution boundary.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("forbidden hdfs dfs subcommand: '{0}'")]
    ForbiddenSubcommand(String),

    #[error("empty command")]
    EmptyCommand,

    #[error("failed to spawn '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("'{command}' timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("command failed after {attempts} attempts: {command}: {last_error}")]
    Exhausted {
        command: String,
        attempts: u32,
        last_error: String,
    },
}

/// Errors from the audit sink.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from the agent loop.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Chat(#[from] crate::llm::ChatError),
}

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENROUTER_API_KEY is not set (env or [agent].api_key in config.toml)")]
    MissingApiKey,

    #[error("OPENROUTER_API_KEY must start with 'sk-'")]
    InvalidApiKey,

    #[error("OPENROUTER_MODEL is not set (env or [agent].model in config.toml)")]
    MissingModel,

    #[error("OPENROUTER_MODEL must look like 'provider/model', got '{0}'")]
    InvalidModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_error_display() {
        let err = ExecError::Timeout {
            command: "hdfs dfs -ls /".to_string(),
            timeout_secs: 20,
        };
        assert!(err.to_string().contains("20s"));
        assert!(err.to_string().contains("hdfs dfs -ls /"));
    }

    #[test]
    fn test_exhausted_error_display() {
        let err = ExecError::Exhausted {
            command: "docker exec namenode hdfs dfs -ls /".to_string(),
            attempts: 3,
            last_error: "timed out".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidModel("gpt4o".to_string());
        assert!(err.to_string().contains("provider/model"));
        assert!(err.to_string().contains("gpt4o"));
    }
}
