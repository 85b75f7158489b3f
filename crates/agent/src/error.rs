use growbox_core::error::ConfigError;

/// Exit status for any failure that stops the agent before its loop runs.
pub const STARTUP_FAILURE_EXIT: u8 = 1;

/// Errors that are fatal at startup.
///
/// Once the sampling loop is running nothing is fatal; per-tick failures
/// are logged and the tick is skipped.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{model} sensor not found at {address}: {reason}")]
    SensorUnavailable {
        model: &'static str,
        address: String,
        reason: String,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl AgentError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        STARTUP_FAILURE_EXIT
    }
}

/// Errors raised by a publish sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Cannot connect to MQTT broker at {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("Publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },

    #[error("Disconnect from {endpoint} failed: {reason}")]
    Disconnect { endpoint: String, reason: String },
}
