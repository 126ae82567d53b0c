//! Response bodies returned by the certificate API.

use serde::{Deserialize, Serialize};

mod certificate;
pub use certificate::*;

mod webhook;
pub use webhook::*;

/// An error body returned by the certificate API alongside a non-2xx status.
/// Every field is optional: the server may answer with an empty or non-JSON
/// body, in which case the client falls back to a generic message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    /// Human-readable reason the request was rejected. This is the message
    /// shown to the user verbatim when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Informational message. The lookup endpoint uses it on not-found
    /// answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiErrorResponse {
    /// The reason the server gave for rejecting the request, if any. Blank
    /// messages count as absent.
    pub fn reason(&self) -> Option<&str> {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
    }
}
