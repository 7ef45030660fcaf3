use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::identity::{Domain, RequestAuthorizer};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    Url(String),
}

impl ApiError {
    /// True when the server rejected the presented credentials or token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}

/// HTTP client bound to one identity domain. Every request carries the
/// `Authorization` header currently held by this client's own authorizer.
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    domain: Domain,
    authorizer: RequestAuthorizer,
}

impl ApiClient {
    pub fn new(base: Url, domain: Domain, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { base: normalize_base(base), client, domain, authorizer: RequestAuthorizer::new() })
    }

    pub fn from_config(cfg: &ClientConfig, domain: Domain) -> Result<Self, ApiError> {
        Self::new(cfg.api_base.clone(), domain, cfg.request_timeout)
    }

    pub fn authorizer(&self) -> &RequestAuthorizer { &self.authorizer }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        // Relative join keeps any path prefix configured on the base URL.
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Url(format!("{}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        debug!(target: "recipebox::api", domain = %self.domain, "{} {}", method, url.path());
        let mut rb = self.client.request(method, url);
        // Snapshot the bearer now; later changes do not touch this request.
        if let Some(h) = self.authorizer.header() {
            let value = HeaderValue::from_str(&h)
                .map_err(|_| ApiError::Decode("bearer token is not a valid header value".into()))?;
            rb = rb.header(AUTHORIZATION, value);
        }
        Ok(rb)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let mut rb = self.request(Method::GET, path)?;
        if !query.is_empty() {
            rb = rb.query(query);
        }
        read_json(rb.send().await?).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let resp = self.request(Method::POST, path)?.json(body).send().await?;
        read_json(resp).await
    }

    /// Send a JSON body and only check the status; the response body is ignored.
    pub async fn send_json<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> Result<(), ApiError> {
        let resp = self.request(method, path)?.json(body).send().await?;
        check_status(resp).await.map(|_| ())
    }

    /// POST without a body, ignoring whatever the server returns on success.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let resp = self.request(Method::POST, path)?.send().await?;
        check_status(resp).await.map(|_| ())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let resp = self.request(Method::DELETE, path)?.send().await?;
        check_status(resp).await.map(|_| ())
    }
}

fn normalize_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let p = format!("{}/", base.path());
        base.set_path(&p);
    }
    base.set_query(None);
    base.set_fragment(None);
    base
}

async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    // Error bodies look like {"message": "..."}; anything else yields no message.
    let body = resp.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.trim().is_empty());
    Err(ApiError::Status { status: status.as_u16(), message })
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let resp = check_status(resp).await?;
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}
