use std::sync::Arc;

use async_trait::async_trait;
use certdir_common::{
    params::{CertificateParams, UpdateCertificateParams},
    views::{
        ApiErrorResponse, Certificate, ConfigureWebhookResponse, ListCertificatesResponse,
        LookupCertificateResponse, WebhookInfoResponse,
    },
};
use http::StatusCode;
use reqwest::{Client, Method, Response, Url};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{credentials::CredentialProvider, error::ApiClientError};


/// Outcome of looking a certificate up by id. A missing certificate is an
/// answer, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Certificate),
    NotFound,
}

/// The certificate collection endpoint.
#[async_trait]
pub trait CertificateApi: Send + Sync {
    /// Every certificate, in the order the server returns them.
    async fn list(&self) -> Result<Vec<Certificate>, ApiClientError>;

    async fn lookup(&self, id: &str) -> Result<Lookup, ApiClientError>;

    async fn create(&self, params: &CertificateParams) -> Result<(), ApiClientError>;

    async fn update(&self, params: &UpdateCertificateParams) -> Result<(), ApiClientError>;

    async fn delete(&self, id: &str) -> Result<(), ApiClientError>;
}

/// The webhook-setup side endpoint.
#[async_trait]
pub trait WebhookApi: Send + Sync {
    async fn webhook_info(&self) -> Result<WebhookInfoResponse, ApiClientError>;

    async fn configure_webhook(&self) -> Result<ConfigureWebhookResponse, ApiClientError>;
}

pub struct ApiClient {
    api_url: Url,
    webhook_url: Option<Url>,
    client: Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    pub fn new(
        api_url: &str,
        webhook_url: Option<&str>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ApiClientError> {
        let api_url = parse_url(api_url)?;
        let webhook_url = webhook_url.map(parse_url).transpose()?;

        let client = Client::builder()
            .user_agent(format!("certdir-client/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_url,
            webhook_url,
            client,
            credentials,
        })
    }

    fn lookup_url(&self, id: &str) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut().append_pair("id", id);
        url
    }

    fn webhook_url(&self) -> Result<Url, ApiClientError> {
        self.webhook_url
            .clone()
            .ok_or(ApiClientError::WebhookNotConfigured)
    }

    async fn get<TResult>(&self, url: Url) -> Result<TResult, ApiClientError>
    where
        TResult: DeserializeOwned,
    {
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(rejected(&Method::GET, &url, status, &body));
        }

        decode(&url, &body)
    }

    /// Sends an administrative request. Only the status of a successful
    /// response matters; its body is ignored.
    async fn send_admin<TBody>(
        &self,
        method: Method,
        url: Url,
        body: Option<&TBody>,
    ) -> Result<(), ApiClientError>
    where
        TBody: Serialize + ?Sized,
    {
        debug!(%method, %url, "sending admin request");
        let mut req = self
            .client
            .request(method.clone(), url.clone())
            .headers(self.credentials.admin_headers()?);

        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        ensure_success(&method, &url, response).await
    }
}

#[async_trait]
impl CertificateApi for ApiClient {
    async fn list(&self) -> Result<Vec<Certificate>, ApiClientError> {
        let response: ListCertificatesResponse = self.get(self.api_url.clone()).await?;
        Ok(response.certificates)
    }

    async fn lookup(&self, id: &str) -> Result<Lookup, ApiClientError> {
        let url = self.lookup_url(id);
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        let body = response.bytes().await?;

        // The server answers an unknown id with a 404 carrying `found: false`.
        if status == StatusCode::NOT_FOUND {
            return match serde_json::from_slice::<LookupCertificateResponse>(&body) {
                Ok(LookupCertificateResponse { found: false, .. }) => Ok(Lookup::NotFound),
                _ => Err(rejected(&Method::GET, &url, status, &body)),
            };
        }

        if !status.is_success() {
            return Err(rejected(&Method::GET, &url, status, &body));
        }

        match decode::<LookupCertificateResponse>(&url, &body)? {
            LookupCertificateResponse {
                found: true,
                certificate: Some(cert),
                ..
            } => Ok(Lookup::Found(cert)),
            LookupCertificateResponse { found: true, .. } => Err(ApiClientError::Decode {
                url: url.to_string(),
                reason: "found certificate is missing from the response".into(),
            }),
            LookupCertificateResponse { found: false, .. } => Ok(Lookup::NotFound),
        }
    }

    async fn create(&self, params: &CertificateParams) -> Result<(), ApiClientError> {
        self.send_admin(Method::POST, self.api_url.clone(), Some(params))
            .await
    }

    async fn update(&self, params: &UpdateCertificateParams) -> Result<(), ApiClientError> {
        self.send_admin(Method::PUT, self.api_url.clone(), Some(params))
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiClientError> {
        self.send_admin::<()>(Method::DELETE, self.lookup_url(id), None)
            .await
    }
}

#[async_trait]
impl WebhookApi for ApiClient {
    async fn webhook_info(&self) -> Result<WebhookInfoResponse, ApiClientError> {
        self.get(self.webhook_url()?).await
    }

    async fn configure_webhook(&self) -> Result<ConfigureWebhookResponse, ApiClientError> {
        let url = self.webhook_url()?;
        debug!(%url, "POST");
        let response = self.client.post(url.clone()).send().await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(rejected(&Method::POST, &url, status, &body));
        }

        decode(&url, &body)
    }
}

fn parse_url(url: &str) -> Result<Url, ApiClientError> {
    let parsed = Url::parse(url).map_err(|e| ApiClientError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ApiClientError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {scheme}"),
        }),
    }
}

fn decode<TResult>(url: &Url, body: &[u8]) -> Result<TResult, ApiClientError>
where
    TResult: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|e| ApiClientError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

async fn ensure_success(method: &Method, url: &Url, response: Response) -> Result<(), ApiClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.bytes().await?;
    Err(rejected(method, url, status, &body))
}

/// Builds the error for a non-2xx answer. Error bodies that are not the
/// expected JSON shape are treated as carrying no reason.
fn rejected(method: &Method, url: &Url, status: StatusCode, body: &[u8]) -> ApiClientError {
    let body = serde_json::from_slice::<ApiErrorResponse>(body).unwrap_or_default();
    warn!(%method, %url, %status, reason = ?body.error, "certificate API rejected request");
    ApiClientError::Rejected { status, body }
}
