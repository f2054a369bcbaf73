use bwilcd_parser::ParseError;
use thiserror::Error;

/// Domain-level errors for data source operations
///
/// Transport implementations convert their specific errors to this type,
/// so HTTP client details never cross the port.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network or communication failure
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not well-formed XML
    #[error("Failed to parse response: {0}")]
    Parse(#[from] ParseError),

    /// Local filesystem failure (downloads)
    #[error("I/O error: {0}")]
    Io(String),

    /// Exactly one of username/password was supplied
    #[error("Both username and password must be provided for authentication")]
    InvalidCredentials,
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
