use crate::const_config::messages::{MSG_SESSION_EXPIRED, MSG_USER_NOT_FOUND};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Empty not allowed")]
    Empty,
    #[error("Maximum length exceeded. {max} allowed but found {actual}")]
    MaxExceeded { max: usize, actual: usize },
}

/// Every way a request made by the client can fail
///
/// The text carried by the variants is what the operator sees, so where the
/// server sent a message it is kept verbatim
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Local input was rejected before anything was sent
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    NotFound(String),
    /// Transport failures and any non-success status without a more specific
    /// mapping
    #[error("{0}")]
    NetworkFailure(String),
    /// The server no longer accepts the credential. The session must be torn
    /// down whenever this is seen
    #[error("{}", MSG_SESSION_EXPIRED)]
    Unauthorized,
    #[error("malformed credential: {0}")]
    MalformedCredential(String),
}

impl ClientError {
    /// Builds a [`NotFound`] using the server's message or the generic one if
    /// the server did not send any
    ///
    /// [`NotFound`]: ClientError::NotFound
    pub fn not_found(server_msg: Option<String>) -> Self {
        Self::NotFound(server_msg.unwrap_or_else(|| MSG_USER_NOT_FOUND.to_string()))
    }
}

impl From<ConversionError> for ClientError {
    fn from(value: ConversionError) -> Self {
        Self::Validation(value.to_string())
    }
}
