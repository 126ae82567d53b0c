//! Client for the certificate directory API.
//!
//! [`client::ApiClient`] speaks the HTTP contract of the certificate endpoint
//! and the webhook-setup endpoint. [`directory::Directory`] and
//! [`webhook::WebhookToggle`] sit on top of it and keep the view state a front
//! end renders: the cached certificate list, the form draft, the last lookup
//! result and the in-flight flags. User-facing notices and silent refresh
//! failures are published on the channel created by [`notify::channel`].

pub mod client;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod notify;
pub mod webhook;
