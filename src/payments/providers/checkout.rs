//! Checkout API client
//!
//! Authenticates with the `token` header. Create and update bodies are always
//! multipart: a JSON `data` part plus an optional `file` part.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::CheckoutConfig;
use crate::error::NoxResult;
use crate::observability::Logger;
use crate::payments::client::ApiClient;
use crate::payments::codec::{path_segment, strip_unset, FileAttachment, OutboundRequest};
use crate::payments::traits::Transport;

pub const AUTH_HEADER: &str = "token";

pub struct CheckoutClient {
    api: ApiClient,
}

impl CheckoutClient {
    pub fn new(config: &CheckoutConfig) -> NoxResult<Self> {
        let api = ApiClient::with_defaults(
            "checkout",
            &config.base_url,
            AUTH_HEADER,
            &config.token,
            &config.http,
        )?;
        Ok(Self { api })
    }

    /// Build with an explicit transport and logger.
    pub fn with_transport(
        config: &CheckoutConfig,
        transport: Arc<dyn Transport>,
        logger: Arc<dyn Logger>,
    ) -> NoxResult<Self> {
        let api = ApiClient::new(
            "checkout",
            &config.base_url,
            AUTH_HEADER,
            &config.token,
            transport,
            logger,
        )?;
        Ok(Self { api })
    }

    /// List checkouts; `query` filters are passed through verbatim.
    pub async fn list_checkouts(&self, query: &HashMap<String, String>) -> NoxResult<Value> {
        self.api
            .request(OutboundRequest::get("/api/checkouts/").query(query.clone()))
            .await
    }

    pub async fn get_checkout(&self, url_id: &str) -> NoxResult<Value> {
        let path = format!("/api/checkout-detail/{}", path_segment(url_id));
        self.api.request(OutboundRequest::get(path)).await
    }

    pub async fn create_checkout(
        &self,
        data: Map<String, Value>,
        file: Option<FileAttachment>,
    ) -> NoxResult<Value> {
        self.api
            .request(OutboundRequest::post("/api/create-checkout/").multipart(data, file))
            .await
    }

    /// Update a checkout. Fields set to `null` in `data` are not transmitted.
    pub async fn update_checkout(
        &self,
        id: i64,
        data: Map<String, Value>,
        file: Option<FileAttachment>,
    ) -> NoxResult<Value> {
        let path = format!("/api/update-checkout/{}", id);
        self.api
            .request(OutboundRequest::put(path).multipart(strip_unset(data), file))
            .await
    }
}
