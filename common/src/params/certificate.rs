use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::views::CertificateStatus;

/// Full certificate body, used both to create a record and to replace one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CertificateParams {
    pub id: String,
    pub owner_name: String,
    pub certificate_url: String,

    /// Omitted when unset so servers without the status column accept the
    /// body unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CertificateStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
}

/// Partial update body that changes only the status of a record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetCertificateStatusParams {
    pub id: String,
    pub status: CertificateStatus,
}

/// Body of a `PUT` against the certificate collection. The server tells the
/// two shapes apart by which fields are present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum UpdateCertificateParams {
    Replace(CertificateParams),
    Status(SetCertificateStatusParams),
}

impl UpdateCertificateParams {
    /// The id of the record the update addresses.
    pub fn id(&self) -> &str {
        match self {
            Self::Replace(params) => &params.id,
            Self::Status(params) => &params.id,
        }
    }
}
