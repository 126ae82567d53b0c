//! View state of the directory and the transitions that change it.
//!
//! Nothing here performs I/O. [`super::Directory`] calls these transitions
//! around each request, and applies responses in the order they complete:
//! whichever list is applied last is what the directory shows.

use std::{collections::HashSet, fmt};

use certdir_common::{
    params::CertificateParams,
    views::{Certificate, CertificateStatus},
};
use chrono::NaiveDate;
use thiserror::Error;

/// A user-triggered operation. Each one has its own in-flight flag, so the
/// same action cannot be started twice, while different actions may overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Refresh,
    Lookup,
    Create,
    Update,
    SetStatus,
    Delete,
    ConfigureWebhook,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Refresh => "Refresh",
            Self::Lookup => "Search",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::SetStatus => "Status change",
            Self::Delete => "Delete",
            Self::ConfigureWebhook => "Webhook configuration",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter a certificate ID")]
    MissingId,

    #[error("Fill in all fields (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Contents of the certificate form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateDraft {
    pub id: String,
    pub owner_name: String,
    pub certificate_url: String,
    pub status: Option<CertificateStatus>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
}

impl CertificateDraft {
    /// Checks that the id, owner and URL are filled in and builds the request
    /// body from the trimmed values. The validity window is passed through
    /// as entered.
    pub fn validate(&self) -> Result<CertificateParams, ValidationError> {
        let id = self.id.trim();
        let owner_name = self.owner_name.trim();
        let certificate_url = self.certificate_url.trim();

        let missing: Vec<&'static str> = [
            ("id", id),
            ("owner_name", owner_name),
            ("certificate_url", certificate_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        Ok(CertificateParams {
            id: id.to_string(),
            owner_name: owner_name.to_string(),
            certificate_url: certificate_url.to_string(),
            status: self.status,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
        })
    }
}

impl From<&Certificate> for CertificateDraft {
    fn from(cert: &Certificate) -> Self {
        Self {
            id: cert.id.clone(),
            owner_name: cert.owner_name.clone(),
            certificate_url: cert.certificate_url.clone(),
            status: Some(cert.status),
            valid_from: cert.valid_from,
            valid_until: cert.valid_until,
        }
    }
}

/// A record open for a full edit. The id is fixed for the session since it
/// is what addresses the record on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    id: String,
    draft: CertificateDraft,
}

impl EditSession {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn draft(&self) -> &CertificateDraft {
        &self.draft
    }

    /// The full-record body for this edit, addressed by the original id.
    pub fn params(&self) -> Result<CertificateParams, ValidationError> {
        let draft = CertificateDraft {
            id: self.id.clone(),
            ..self.draft.clone()
        };
        draft.validate()
    }
}

/// Holds the in-flight flag of one action. The flag is cleared on drop, which
/// also happens when the future awaiting the request is cancelled.
#[must_use]
pub struct InFlight<'a> {
    state: &'a mut DirectoryState,
    action: Action,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.finish(self.action);
    }
}

#[derive(Debug, Default)]
pub struct DirectoryState {
    certificates: Vec<Certificate>,
    lookup_result: Option<Certificate>,
    draft: CertificateDraft,
    editing: Option<EditSession>,
    in_flight: HashSet<Action>,
    last_error: Option<String>,
}

impl DirectoryState {
    /// The cached certificate list from the last successful refresh.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn find(&self, id: &str) -> Option<&Certificate> {
        self.certificates.iter().find(|cert| cert.id == id)
    }

    /// The record shown by the last successful lookup.
    pub fn lookup_result(&self) -> Option<&Certificate> {
        self.lookup_result.as_ref()
    }

    pub fn draft(&self) -> &CertificateDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut CertificateDraft {
        &mut self.draft
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn is_busy(&self, action: Action) -> bool {
        self.in_flight.contains(&action)
    }

    /// Marks `action` as in flight until the returned guard is dropped.
    /// Returns `None` if it already is.
    pub fn track(&mut self, action: Action) -> Option<InFlight<'_>> {
        if !self.begin(action) {
            return None;
        }

        Some(InFlight {
            state: self,
            action,
        })
    }

    fn begin(&mut self, action: Action) -> bool {
        self.in_flight.insert(action)
    }

    fn finish(&mut self, action: Action) {
        self.in_flight.remove(&action);
    }

    /// Replaces the cached list, regardless of which request produced it.
    pub fn apply_list(&mut self, certificates: Vec<Certificate>) {
        self.certificates = certificates;
    }

    pub fn show_lookup(&mut self, result: Option<Certificate>) {
        self.lookup_result = result;
    }

    /// Clears the displayed lookup result if it is the record `id`.
    pub fn clear_lookup_if(&mut self, id: &str) {
        if self.lookup_result.as_ref().is_some_and(|cert| cert.id == id) {
            self.lookup_result = None;
        }
    }

    pub fn reset_draft(&mut self) {
        self.draft = CertificateDraft::default();
    }

    /// Opens the cached record `id` for a full edit. Returns `false` if the
    /// record is not in the cached list.
    pub fn start_edit(&mut self, id: &str) -> bool {
        let Some(cert) = self.find(id) else {
            return false;
        };

        let session = EditSession {
            id: cert.id.clone(),
            draft: cert.into(),
        };
        self.editing = Some(session);
        true
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut CertificateDraft> {
        self.editing.as_mut().map(|session| &mut session.draft)
    }

    /// Leaves edit mode, discarding the edit draft.
    pub fn finish_edit(&mut self) {
        self.editing = None;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}
