use certdir_common::views::ApiErrorResponse;
use http::StatusCode;
use thiserror::Error;

use crate::{credentials::CredentialError, directory::state::{Action, ValidationError}};

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Webhook endpoint is not configured")]
    WebhookNotConfigured,

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("API rejected the request with status {status}")]
    Rejected {
        status: StatusCode,
        body: ApiErrorResponse,
    },

    #[error("Invalid response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiClientError {
    /// The reason the server gave when it rejected the request.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { body, .. } => body.reason(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}

/// Errors returned by directory and webhook operations. The `Display` output
/// of every variant is the message shown to the user.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{action} is already in progress")]
    Busy { action: Action },

    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiClientError,
    },

    #[error("Network error")]
    Network {
        #[source]
        source: ApiClientError,
    },

    #[error("Search failed")]
    SearchFailed {
        #[source]
        source: ApiClientError,
    },

    #[error("Failed to configure webhook")]
    WebhookConfiguration { reason: Option<String> },

    #[error("Certificate {id} is not in the directory")]
    UnknownCertificate { id: String },

    #[error("No certificate is being edited")]
    NotEditing,

    #[error(transparent)]
    Client(ApiClientError),
}

impl DirectoryError {
    /// Classifies a failed mutation. Rejections carry the server's message, or
    /// `fallback` when it gave none.
    pub(crate) fn from_mutation(err: ApiClientError, fallback: &str) -> Self {
        match err {
            ApiClientError::Rejected { .. } => {
                let message = err.reason().unwrap_or(fallback).to_string();
                Self::Rejected {
                    message,
                    source: err,
                }
            }
            ApiClientError::Transport(_) | ApiClientError::Decode { .. } => {
                Self::Network { source: err }
            }
            _ => Self::Client(err),
        }
    }
}
