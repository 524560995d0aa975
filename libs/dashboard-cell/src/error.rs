use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("You are not logged in")]
    Unauthenticated,

    /// Non-2xx response; carries the server's envelope message.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Upload failed: {0}")]
    Upload(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("No row {0} in {1}")]
    UnknownRow(String, &'static str),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{0}' is read-only")]
    ReadOnly(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
