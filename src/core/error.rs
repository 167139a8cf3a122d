/// mscli Error Module
///
/// This module defines the error type shared by every layer of the client.
/// Server-side failures keep their numeric code and message so they can be
/// reported to the user in the same two-line form the server tools use.
use thiserror::Error;

/// Error type for the mscli application.
///
/// Covers the failure tiers the client distinguishes:
/// - errors reported by SQL Server itself (code + message)
/// - other driver faults (I/O, TLS, protocol, value conversion)
/// - configuration and line-editor failures
#[derive(Error, Debug)]
pub enum MscliError {
    /// An error token returned by the server
    #[error("Error code {code}.\n{message}")]
    Server { code: u32, message: String },

    /// Any other failure raised by the SQL Server driver
    #[error("Error: {0}")]
    Driver(tiberius::error::Error),

    /// File system and terminal I/O errors
    #[error("Error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Line editor and credential prompt errors
    #[error("Input error: {0}")]
    Input(String),
}

impl MscliError {
    /// Builds a server error from its code and message.
    pub fn server(code: u32, message: impl Into<String>) -> Self {
        MscliError::Server {
            code,
            message: message.into(),
        }
    }

    /// Whether the error was reported by the server rather than raised locally.
    pub fn is_server(&self) -> bool {
        matches!(self, MscliError::Server { .. })
    }
}

impl From<tiberius::error::Error> for MscliError {
    fn from(err: tiberius::error::Error) -> Self {
        match err {
            tiberius::error::Error::Server(token) => MscliError::Server {
                code: token.code(),
                message: token.message().to_string(),
            },
            other => MscliError::Driver(other),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MscliError>;
