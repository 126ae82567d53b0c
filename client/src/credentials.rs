//! Credentials attached to mutating requests.
//!
//! The certificate API identifies an administrator by a static username sent
//! in the `X-Admin-Token` header. Anyone holding a copy of the client can
//! replay it. Call sites only see [`CredentialProvider`], so the header can
//! later be produced by a real signed-token scheme.

use http::{
    HeaderMap, HeaderValue,
    header::{HeaderName, InvalidHeaderValue},
};
use thiserror::Error;

/// Header carrying the admin identity on create, update and delete calls.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No admin identity configured")]
    Missing,

    #[error("Admin identity is not a valid header value: {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),
}

pub trait CredentialProvider: Send + Sync {
    /// Headers that authorize an administrative request.
    fn admin_headers(&self) -> Result<HeaderMap, CredentialError>;
}

/// Sends a fixed admin username as the admin token.
#[derive(Debug, Clone)]
pub struct StaticAdminIdentity {
    username: String,
}

impl StaticAdminIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl CredentialProvider for StaticAdminIdentity {
    fn admin_headers(&self) -> Result<HeaderMap, CredentialError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(CredentialError::Missing);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(ADMIN_TOKEN_HEADER),
            HeaderValue::from_str(username)?,
        );
        Ok(headers)
    }
}
