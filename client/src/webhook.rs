//! Status toggle for the messaging-bot webhook registration.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    client::WebhookApi,
    directory::state::Action,
    error::DirectoryError,
    notify::Notifier,
};

const WEBHOOK_CONFIGURED: &str = "Webhook configured";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WebhookStatus {
    /// Not checked yet.
    #[default]
    Unknown,

    /// A webhook is registered at `url`.
    Active { url: String },

    NotConfigured,

    /// The endpoint could not be reached or reported an error.
    Error,
}

pub struct WebhookToggle {
    api: Arc<dyn WebhookApi>,
    notifier: Notifier,
    status: WebhookStatus,
    loading: bool,
}

impl WebhookToggle {
    pub fn new(api: Arc<dyn WebhookApi>, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            status: WebhookStatus::Unknown,
            loading: false,
        }
    }

    pub fn status(&self) -> &WebhookStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Queries the registration and classifies it.
    #[tracing::instrument(skip(self))]
    pub async fn check(&mut self) -> WebhookStatus {
        self.status = match self.api.webhook_info().await {
            Ok(info) if info.error.is_some() => {
                warn!(error = ?info.error, "webhook endpoint reported an error");
                WebhookStatus::Error
            }
            Ok(info) => match info.registered_url() {
                Some(url) => WebhookStatus::Active {
                    url: url.to_string(),
                },
                None => WebhookStatus::NotConfigured,
            },
            Err(err) => {
                warn!(error = %err, "failed to check webhook status");
                WebhookStatus::Error
            }
        };

        debug!(status = ?self.status, "webhook status checked");
        self.status.clone()
    }

    /// Asks the endpoint to register the webhook, then checks the result.
    #[tracing::instrument(skip(self))]
    pub async fn configure(&mut self) -> Result<WebhookStatus, DirectoryError> {
        if self.loading {
            return Err(DirectoryError::Busy {
                action: Action::ConfigureWebhook,
            });
        }

        let result = {
            let _loading = Loading::start(&mut self.loading);
            self.api.configure_webhook().await
        };

        let reason = match result {
            Ok(response) if response.ok => {
                info!("webhook configured");
                self.notifier.success(WEBHOOK_CONFIGURED);
                return Ok(self.check().await);
            }
            Ok(response) => response.error.or(response.description),
            Err(err) => Some(err.to_string()),
        };

        warn!(reason = ?reason, "webhook configuration failed");
        let err = DirectoryError::WebhookConfiguration { reason };
        self.notifier.error(err.to_string());
        Err(err)
    }
}

/// Sets a loading flag and clears it again on drop.
struct Loading<'a>(&'a mut bool);

impl<'a> Loading<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
