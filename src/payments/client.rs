use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde_json::Value;

use crate::config::{Credential, HttpSettings};
use crate::error::{NoxError, NoxResult};
use crate::observability::{Logger, TracingLogger};
use crate::payments::classifier::classify;
use crate::payments::codec::{self, OutboundRequest, RawResponse};
use crate::payments::traits::Transport;
use crate::payments::transport::ReqwestTransport;

/// Request/response plumbing shared by the checkout, payment-link and v2 clients.
///
/// Holds the backend's base address, its static auth header and a transport.
/// Only immutable configuration is shared between calls.
#[derive(Clone)]
pub struct ApiClient {
    backend: &'static str,
    base_url: Url,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
    logger: Arc<dyn Logger>,
}

impl ApiClient {
    pub fn new(
        backend: &'static str,
        base_url: &str,
        auth_header: &'static str,
        credential: &Credential,
        transport: Arc<dyn Transport>,
        logger: Arc<dyn Logger>,
    ) -> NoxResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| NoxError::config(format!("Invalid {} base URL: {}", backend, e)))?;

        if credential.is_empty() {
            return Err(NoxError::config(format!("{} credential is empty", backend)));
        }

        let mut value = HeaderValue::from_str(credential.expose()).map_err(|_| {
            NoxError::config(format!("{} credential is not a valid header value", backend))
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(auth_header), value);

        Ok(Self {
            backend,
            base_url,
            headers,
            transport,
            logger,
        })
    }

    /// Client using the reqwest transport and `tracing` logger.
    pub fn with_defaults(
        backend: &'static str,
        base_url: &str,
        auth_header: &'static str,
        credential: &Credential,
        http: &HttpSettings,
    ) -> NoxResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(http)?);
        Self::new(
            backend,
            base_url,
            auth_header,
            credential,
            transport,
            TracingLogger::shared(backend),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Send `request` and decode the response body as JSON.
    pub async fn request(&self, request: OutboundRequest) -> NoxResult<Value> {
        let response = self.dispatch(request).await?;

        codec::decode(&response.body).map_err(|e| {
            self.logger.error(&format!(
                "{} returned an undecodable body (HTTP {}): {}",
                self.backend, response.status, e
            ));
            NoxError::api(response.status, response.body_text())
        })
    }

    /// Send `request` and discard the response body.
    pub async fn request_discarding(&self, request: OutboundRequest) -> NoxResult<()> {
        self.dispatch(request).await.map(|_| ())
    }

    async fn dispatch(&self, request: OutboundRequest) -> NoxResult<RawResponse> {
        let method = request.method.clone();
        let path = request.path.clone();
        self.logger
            .debug(&format!("{} request: {} {}", self.backend, method, path));

        let http_request = codec::encode(request, &self.base_url, &self.headers)?;
        let outcome = self.transport.send(http_request).await;

        classify(outcome).map_err(|e| {
            self.logger.error(&format!(
                "{} request {} {} failed: {}",
                self.backend, method, path, e
            ));
            e
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
