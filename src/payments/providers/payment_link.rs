//! Payment-link API client (`api-key` header, JSON bodies).

use std::sync::Arc;

use serde_json::Value;

use crate::config::PaymentLinkConfig;
use crate::error::NoxResult;
use crate::observability::Logger;
use crate::payments::client::ApiClient;
use crate::payments::codec::{path_segment, resolve, strip_unset, OutboundRequest};
use crate::payments::traits::Transport;
use crate::payments::types::{LinkUpdate, PaymentLinkData};

pub const AUTH_HEADER: &str = "api-key";

pub struct PaymentLinkClient {
    api: ApiClient,
}

impl PaymentLinkClient {
    pub fn new(config: &PaymentLinkConfig) -> NoxResult<Self> {
        let api = ApiClient::with_defaults(
            "payment-link",
            &config.base_url,
            AUTH_HEADER,
            &config.api_key,
            &config.http,
        )?;
        Ok(Self { api })
    }

    pub fn with_transport(
        config: &PaymentLinkConfig,
        transport: Arc<dyn Transport>,
        logger: Arc<dyn Logger>,
    ) -> NoxResult<Self> {
        let api = ApiClient::new(
            "payment-link",
            &config.base_url,
            AUTH_HEADER,
            &config.api_key,
            transport,
            logger,
        )?;
        Ok(Self { api })
    }

    pub async fn create_link(&self, data: &PaymentLinkData) -> NoxResult<Value> {
        self.api
            .request(OutboundRequest::post("/link/").json(data.to_wire()?))
            .await
    }

    /// Fetch a link's details, adding its public `full_link` address.
    pub async fn get_link(&self, uuid: &str) -> NoxResult<Value> {
        let path = format!("/link/{}", path_segment(uuid));
        let mut details = self
            .api
            .request(OutboundRequest::get(path.clone()).query_param("format", "json"))
            .await?;

        if let Value::Object(map) = &mut details {
            let full_link = resolve(self.api.base_url(), &path)?;
            map.insert("full_link".to_string(), Value::String(full_link.to_string()));
        }

        Ok(details)
    }

    /// Apply a partial update; the response body is discarded.
    pub async fn update_link(&self, uuid: &str, update: &LinkUpdate) -> NoxResult<()> {
        let path = format!("/link/{}", path_segment(uuid));
        self.api
            .request_discarding(OutboundRequest::put(path).json(strip_unset(update.to_wire()?)))
            .await
    }
}
