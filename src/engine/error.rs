/// Failures of the protocol client. A command answered with `success: false`
/// is not an error, it resolves normally with the engine's response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("command '{command}' timed out after {timeout_ms} ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("connection lost before the engine answered")]
    Disconnected,

    #[error("engine client shut down")]
    Shutdown,

    #[error("failed to encode command: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("invalid payload for '{command}': {source}")]
    InvalidPayload {
        command: String,
        source: serde_json::Error,
    },
}
