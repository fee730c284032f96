//! Error types for the output and its inbound messages.

use thiserror::Error;

/// Errors raised while driving an [`OlaOutput`](crate::output::OlaOutput).
///
/// None of these are fatal: validation errors leave the previous state in
/// place and transport errors only flip the connection flag.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OutputError {
    /// Offset write started outside 1..=512.
    #[error("Channel must be between 1 and 512 inclusive (got {0})")]
    ChannelOutOfRange(i64),

    /// Offset write started with a float or symbol.
    #[error("Channel must be an integer")]
    ChannelNotInteger,

    #[error("Universe must be between 0 and 4294967295 (got {0})")]
    UniverseOutOfRange(i64),

    /// The daemon handshake failed.
    #[error("OLA connection failed. olad must be running to send data. ({reason})")]
    Setup { reason: String },

    /// A send failed while we believed we were connected.
    #[error("Connection to OLA lost ({reason})")]
    ConnectionLost { reason: String },

    /// A send failed and we were not connected to begin with.
    #[error("Not connected to OLA ({reason})")]
    NotConnected { reason: String },
}

impl OutputError {
    pub fn setup(err: &anyhow::Error) -> Self {
        Self::Setup {
            reason: format!("{:#}", err),
        }
    }

    pub fn connection_lost(err: &anyhow::Error) -> Self {
        Self::ConnectionLost {
            reason: format!("{:#}", err),
        }
    }

    pub fn not_connected(err: &anyhow::Error) -> Self {
        Self::NotConnected {
            reason: format!("{:#}", err),
        }
    }
}

/// Errors from parsing a line of inbound text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MessageError {
    #[error("Empty message")]
    Empty,

    #[error("Unknown message: {0}")]
    UnknownSelector(String),

    #[error("Message '{0}' expects an argument")]
    MissingArgument(&'static str),

    #[error("Message '{selector}' expects a number, got '{value}'")]
    NotANumber {
        selector: &'static str,
        value: String,
    },
}
