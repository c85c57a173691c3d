//! Errors of an exchange

use serde::{Deserialize, Serialize};
use std::fmt;

/// A boxed error cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for exchanges.
pub type Result<T> = std::result::Result<T, Error>;

/// The error of one exchange.
///
/// Callers get exactly one response or one of these per exchange; stream
/// consumers get zero or more partial responses followed by at most one.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be encoded for the wire
    #[error("invalid request encoding: {0}")]
    InvalidRequestEncoding(#[source] BoxError),

    /// The transport failed before a response was received
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    /// The backend answered with a non-success status
    #[error("unsuccessful status {status}{}", .payload.as_ref().map(|p| format!(": {p}")).unwrap_or_default())]
    UnsuccessfulStatus {
        /// The status code
        status: u16,
        /// The decoded vendor error, if the body carried one
        payload: Option<VendorError>,
    },

    /// The backend reported an error in-band
    #[error("vendor error: {0}")]
    Vendor(VendorError),

    /// The stream ended with bytes that never decoded
    #[error("stream decode failed: {cause}")]
    StreamDecodeFailed {
        /// The undecodable remainder
        buffer: String,
        /// The last decode failure
        #[source]
        cause: BoxError,
    },

    /// The backend answered with an unexpected content type
    #[error("invalid content type: {0}")]
    InvalidContentType(String),

    /// No registered adapter accepts the request
    #[error("unhandled request")]
    UnhandledRequest,

    /// Tool call arguments are not a JSON object
    #[error("failed to decode arguments of tool '{tool}': {cause}")]
    FailedToDecodeToolArguments {
        /// The tool name
        tool: String,
        /// The parse failure
        #[source]
        cause: BoxError,
    },

    /// Tool call arguments lack parameters the schema requires
    #[error("missing required arguments of tool '{tool}': {}", .missing.join(", "))]
    MissingRequiredToolArguments {
        /// The tool name
        tool: String,
        /// The absent parameter names
        missing: Vec<String>,
    },

    /// A tool callback failed
    #[error(transparent)]
    Tool(anyhow::Error),
}

impl Error {
    /// Wrap a transport failure.
    pub fn transport(cause: impl Into<BoxError>) -> Self {
        Self::Transport(cause.into())
    }

    /// Wrap a request encoding failure.
    pub fn encoding(cause: impl Into<BoxError>) -> Self {
        Self::InvalidRequestEncoding(cause.into())
    }
}

/// An error payload decoded from a vendor response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct VendorError {
    /// The human-readable message
    pub message: String,

    /// The vendor error type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// The vendor error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl VendorError {
    /// Create a vendor error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

impl fmt::Display for VendorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{kind}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}
