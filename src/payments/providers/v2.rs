//! V2 payment/account API client
//!
//! Besides the REST operations this client owns the webhook signing secret,
//! so it can validate callbacks directly or hand out a configured
//! [`WebhookServer`](crate::webhook::WebhookServer).

use std::sync::Arc;

use serde_json::Value;

use crate::config::{Credential, V2Config};
use crate::error::{NoxError, NoxResult};
use crate::observability::Logger;
use crate::payments::client::ApiClient;
use crate::payments::codec::{path_segment, strip_unset, OutboundRequest};
use crate::payments::traits::Transport;
use crate::payments::types::{CreatePaymentCashOutData, CreatePaymentData};
use crate::webhook::signature;

pub const AUTH_HEADER: &str = "api-key";

/// An empty secret would make every signature computable from the payload alone.
fn signing_secret(config: &V2Config) -> NoxResult<Credential> {
    if config.secret_key.expose().trim().is_empty() {
        return Err(NoxError::config("v2 signing secret is empty"));
    }
    Ok(config.secret_key.clone())
}

pub struct V2Client {
    api: ApiClient,
    secret_key: Credential,
}

impl V2Client {
    pub fn new(config: &V2Config) -> NoxResult<Self> {
        let secret_key = signing_secret(config)?;
        let api = ApiClient::with_defaults(
            "v2",
            &config.base_url,
            AUTH_HEADER,
            &config.api_token,
            &config.http,
        )?;
        Ok(Self { api, secret_key })
    }

    pub fn with_transport(
        config: &V2Config,
        transport: Arc<dyn Transport>,
        logger: Arc<dyn Logger>,
    ) -> NoxResult<Self> {
        let secret_key = signing_secret(config)?;
        let api = ApiClient::new(
            "v2",
            &config.base_url,
            AUTH_HEADER,
            &config.api_token,
            transport,
            logger,
        )?;
        Ok(Self { api, secret_key })
    }

    pub async fn get_account(&self) -> NoxResult<Value> {
        self.api.request(OutboundRequest::get("/account")).await
    }

    /// Create a payment. Unset optional fields are not transmitted.
    pub async fn create_payment(&self, data: &CreatePaymentData) -> NoxResult<Value> {
        self.api
            .request(OutboundRequest::post("/payment").json(strip_unset(data.to_wire()?)))
            .await
    }

    /// Create a cash-out. The payload is sent as-is, unset fields as `null`.
    pub async fn create_payment_cash_out(&self, data: &CreatePaymentCashOutData) -> NoxResult<Value> {
        self.api
            .request(OutboundRequest::post("/payment").json(data.to_wire()?))
            .await
    }

    pub async fn get_payment(&self, identifier: &str) -> NoxResult<Value> {
        let path = format!("/payment/{}", path_segment(identifier));
        self.api.request(OutboundRequest::get(path)).await
    }

    /// Ask the platform to deliver the webhook for `txid` again.
    pub async fn resend_webhook(&self, txid: &str) -> NoxResult<()> {
        let path = format!("/payment/webhook/resend/{}", path_segment(txid));
        self.api.request_discarding(OutboundRequest::get(path)).await
    }

    /// Check a webhook signature against this client's signing secret.
    pub fn validate_signature(&self, payload: &[u8], presented: &str) -> NoxResult<bool> {
        signature::require_valid(self.secret_key.expose(), payload, presented.as_bytes())?;
        Ok(true)
    }

    #[cfg(feature = "server")]
    pub fn webhook_server(&self) -> crate::webhook::WebhookServer {
        crate::webhook::WebhookServer::new(self.secret_key.clone())
    }
}
