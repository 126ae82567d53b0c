use serde::{Deserialize, Serialize};

/// Response body of the webhook-setup endpoint for a status query. The
/// endpoint forwards the messaging platform's webhook info verbatim, or an
/// `error` when it is not set up to talk to the platform at all.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookInfoResponse {
    #[serde(default)]
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<WebhookInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookInfoResponse {
    /// The registered webhook URL, if one is set.
    pub fn registered_url(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|info| info.url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookInfo {
    /// Registered webhook URL. Empty when no webhook is registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_update_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_message: Option<String>,
}

/// Response body of the webhook-setup endpoint for a configure request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigureWebhookResponse {
    #[serde(default)]
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
