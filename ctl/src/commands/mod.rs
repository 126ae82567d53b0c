use std::sync::Arc;

use certdir_client::{
    client::ApiClient,
    directory::Directory,
    notify::{self, DirectoryEvent, Notifier},
    webhook::WebhookToggle,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::output;

pub mod certificates;
pub mod webhook;

/// Shared state of a single `certctl` invocation.
pub struct Context {
    api: Arc<ApiClient>,
    notifier: Notifier,
    events: UnboundedReceiver<DirectoryEvent>,
    pub json: bool,
}

impl Context {
    pub fn new(api: Arc<ApiClient>, json: bool) -> Self {
        let (notifier, events) = notify::channel();
        Self {
            api,
            notifier,
            events,
            json,
        }
    }

    pub fn directory(&self) -> Directory {
        Directory::new(self.api.clone(), self.notifier.clone())
    }

    pub fn webhook(&self) -> WebhookToggle {
        WebhookToggle::new(self.api.clone(), self.notifier.clone())
    }

    /// Prints pending notices to stderr and returns the reasons of any list
    /// refreshes that failed since the last flush.
    pub fn flush(&mut self) -> Vec<String> {
        let mut refresh_failures = Vec::new();

        while let Ok(event) = self.events.try_recv() {
            match event {
                DirectoryEvent::Notice(notice) => output::print_notice(&notice),
                DirectoryEvent::RefreshFailed { reason } => {
                    debug!(%reason, "list refresh failed");
                    refresh_failures.push(reason);
                }
            }
        }

        refresh_failures
    }
}
