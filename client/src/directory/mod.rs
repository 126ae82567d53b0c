//! The certificate directory: the operations a front end triggers and the
//! view state they update.

use std::sync::Arc;

use certdir_common::{
    params::{SetCertificateStatusParams, UpdateCertificateParams},
    views::CertificateStatus,
};
use tracing::{debug, info, warn};

use crate::{
    client::{CertificateApi, Lookup},
    error::DirectoryError,
    notify::Notifier,
};

pub mod state;

use state::{Action, CertificateDraft, DirectoryState, InFlight, ValidationError};

#[cfg(test)]
mod tests;

const CERTIFICATE_FOUND: &str = "Certificate found";
const CERTIFICATE_NOT_FOUND: &str = "Certificate not found";
const CERTIFICATE_ADDED: &str = "Certificate added";
const ADD_FAILED: &str = "Failed to add certificate";
const CERTIFICATE_UPDATED: &str = "Certificate updated";
const UPDATE_FAILED: &str = "Failed to update certificate";
const STATUS_UPDATED: &str = "Status updated";
const STATUS_FAILED: &str = "Failed to update status";
const CERTIFICATE_DELETED: &str = "Certificate deleted";
const DELETE_FAILED: &str = "Failed to delete certificate";
const DELETE_PROMPT: &str = "Delete certificate?";

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// The user declined the confirmation and no request was sent.
    Declined,
}

pub struct Directory {
    api: Arc<dyn CertificateApi>,
    notifier: Notifier,
    state: DirectoryState,
}

impl Directory {
    pub fn new(api: Arc<dyn CertificateApi>, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            state: DirectoryState::default(),
        }
    }

    pub fn state(&self) -> &DirectoryState {
        &self.state
    }

    /// The create form.
    pub fn draft_mut(&mut self) -> &mut CertificateDraft {
        self.state.draft_mut()
    }

    /// Refetches the full list. On failure the cached list is kept and the
    /// failure is only logged and published as
    /// [`crate::notify::DirectoryEvent::RefreshFailed`].
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&mut self) {
        let result = {
            let Some(_in_flight) = self.state.track(Action::Refresh) else {
                debug!("refresh already in flight");
                return;
            };
            self.api.list().await
        };

        match result {
            Ok(certificates) => {
                debug!(count = certificates.len(), "directory refreshed");
                self.state.apply_list(certificates);
            }
            Err(err) => {
                warn!(error = %err, "failed to refresh certificate list");
                self.notifier.refresh_failed(err.to_string());
            }
        }
    }

    /// Looks a certificate up by id. Neither outcome touches the cached list.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&mut self, id: &str) -> Result<Lookup, DirectoryError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(self.fail(ValidationError::MissingId.into()));
        }

        let result = {
            let _in_flight = in_flight(&mut self.state, Action::Lookup)?;
            self.api.lookup(id).await
        };

        match result {
            Ok(Lookup::Found(cert)) => {
                self.state.show_lookup(Some(cert.clone()));
                self.state.clear_error();
                self.notifier.success(CERTIFICATE_FOUND);
                Ok(Lookup::Found(cert))
            }
            Ok(Lookup::NotFound) => {
                self.state.show_lookup(None);
                self.notifier.error(CERTIFICATE_NOT_FOUND);
                Ok(Lookup::NotFound)
            }
            Err(source) => Err(self.fail(DirectoryError::SearchFailed { source })),
        }
    }

    /// Submits the create form. On success the form is cleared and the list
    /// is refetched.
    #[tracing::instrument(skip(self))]
    pub async fn create(&mut self) -> Result<(), DirectoryError> {
        let params = match self.state.draft().validate() {
            Ok(params) => params,
            Err(err) => return Err(self.fail(err.into())),
        };

        let result = {
            let _in_flight = in_flight(&mut self.state, Action::Create)?;
            self.api.create(&params).await
        };

        if let Err(err) = result {
            return Err(self.fail(DirectoryError::from_mutation(err, ADD_FAILED)));
        }

        info!(id = %params.id, "certificate created");
        self.notifier.success(CERTIFICATE_ADDED);
        self.state.reset_draft();
        self.state.clear_error();
        self.refresh().await;
        Ok(())
    }

    /// Opens a cached record for a full edit and returns its draft.
    pub fn begin_edit(&mut self, id: &str) -> Result<&mut CertificateDraft, DirectoryError> {
        if !self.state.start_edit(id) {
            return Err(self.fail(DirectoryError::UnknownCertificate { id: id.to_string() }));
        }

        self.state
            .edit_draft_mut()
            .ok_or(DirectoryError::NotEditing)
    }

    pub fn cancel_edit(&mut self) {
        self.state.finish_edit();
    }

    /// Sends the edited record as a full replacement. Edit mode is left only
    /// when the server accepts it.
    #[tracing::instrument(skip(self))]
    pub async fn save_edit(&mut self) -> Result<(), DirectoryError> {
        let params = match self.state.editing().map(|session| session.params()) {
            Some(Ok(params)) => params,
            Some(Err(err)) => return Err(self.fail(err.into())),
            None => return Err(DirectoryError::NotEditing),
        };

        let result = {
            let _in_flight = in_flight(&mut self.state, Action::Update)?;
            self.api
                .update(&UpdateCertificateParams::Replace(params.clone()))
                .await
        };

        if let Err(err) = result {
            return Err(self.fail(DirectoryError::from_mutation(err, UPDATE_FAILED)));
        }

        info!(id = %params.id, "certificate updated");
        self.notifier.success(CERTIFICATE_UPDATED);
        self.state.finish_edit();
        self.state.clear_error();
        self.refresh().await;
        Ok(())
    }

    /// Changes only the status of a record.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(
        &mut self,
        id: &str,
        status: CertificateStatus,
    ) -> Result<(), DirectoryError> {
        let result = {
            let _in_flight = in_flight(&mut self.state, Action::SetStatus)?;
            self.api
                .update(&UpdateCertificateParams::Status(SetCertificateStatusParams {
                    id: id.to_string(),
                    status,
                }))
                .await
        };

        if let Err(err) = result {
            return Err(self.fail(DirectoryError::from_mutation(err, STATUS_FAILED)));
        }

        info!(id, %status, "certificate status changed");
        self.notifier.success(STATUS_UPDATED);
        self.state.clear_error();
        self.refresh().await;
        Ok(())
    }

    /// Deletes a record after `confirm` agrees. A displayed lookup result for
    /// the same id is cleared.
    #[tracing::instrument(skip(self, confirm))]
    pub async fn delete(
        &mut self,
        id: &str,
        confirm: &impl Confirm,
    ) -> Result<Deletion, DirectoryError> {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!("deletion declined");
            return Ok(Deletion::Declined);
        }

        let result = {
            let _in_flight = in_flight(&mut self.state, Action::Delete)?;
            self.api.delete(id).await
        };

        if let Err(err) = result {
            return Err(self.fail(DirectoryError::from_mutation(err, DELETE_FAILED)));
        }

        info!(id, "certificate deleted");
        self.notifier.success(CERTIFICATE_DELETED);
        self.state.clear_error();
        self.refresh().await;
        self.state.clear_lookup_if(id);
        Ok(Deletion::Deleted)
    }

    /// Reports `err` to the user and remembers it as the last error.
    fn fail(&mut self, err: DirectoryError) -> DirectoryError {
        let message = err.to_string();
        warn!(error = %message, "directory operation failed");
        self.notifier.error(message.clone());
        self.state.record_error(message);
        err
    }
}

fn in_flight(state: &mut DirectoryState, action: Action) -> Result<InFlight<'_>, DirectoryError> {
    state.track(action).ok_or_else(|| {
        debug!(%action, "action already in flight");
        DirectoryError::Busy { action }
    })
}
