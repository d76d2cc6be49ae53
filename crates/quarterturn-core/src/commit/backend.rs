//! Backend rotation endpoint interface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One rotation request: the server filename and the angle to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotateRequest {
    pub filename: String,
    pub degrees: i32,
}

impl RotateRequest {
    pub fn new(filename: impl Into<String>, degrees: i32) -> Self {
        Self {
            filename: filename.into(),
            degrees,
        }
    }

    /// Form fields posted to the endpoint. Degrees are sent as a decimal string.
    pub fn form_fields(&self) -> [(&'static str, String); 2] {
        [
            ("filename", self.filename.clone()),
            ("degrees", self.degrees.to_string()),
        ]
    }
}

/// Raw HTTP reply from the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotateReply {
    pub status: u16,
    pub body: String,
}

impl RotateReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error types for failed rotation requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The request could not be built or the response could not be read.
    #[error("Invalid request or response: {0}")]
    Body(String),
}

/// A backend able to apply one rotation.
///
/// Implementations issue exactly one request per call and report the raw
/// reply. Classifying the reply is left to the commit pipeline.
#[allow(async_fn_in_trait)]
pub trait RotateBackend {
    async fn rotate(&self, request: &RotateRequest) -> Result<RotateReply, TransportError>;
}
