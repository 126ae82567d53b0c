use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Verification status of a certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    /// The certificate is genuine and in force. Servers that predate the
    /// status column never send the field, and their records are treated as
    /// valid.
    #[default]
    Valid,

    /// The certificate has been revoked or was never genuine.
    Invalid,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown certificate status {0:?} (expected valid or invalid)")]
pub struct ParseStatusError(String);

impl FromStr for CertificateStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "valid" => Ok(Self::Valid),
            "invalid" => Ok(Self::Invalid),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A certificate record as stored by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Certificate {
    /// Externally chosen identifier, e.g. `CERT-2024-001`. This is the only
    /// field a client may use to address a record.
    pub id: String,

    /// Name of the person or organisation the certificate was issued to.
    pub owner_name: String,

    /// Link to the certificate artifact.
    pub certificate_url: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: CertificateStatus,

    /// First day the certificate is in force, inclusive.
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,

    /// Last day the certificate is in force, inclusive.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,

    /// Creation timestamp assigned by the server. Kept verbatim, the server
    /// does not render it as RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Response body of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListCertificatesResponse {
    #[serde(default)]
    pub certificates: Vec<Certificate>,
}

/// Response body of the lookup endpoint. The server answers `{found: true,
/// certificate}` with a 200 and `{found: false, message}` with a 404.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupCertificateResponse {
    pub found: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
