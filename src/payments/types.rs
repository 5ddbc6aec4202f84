//! Request payloads for the backend clients.
//!
//! Each type converts to its wire representation with `to_wire()`, which
//! keeps unset fields as `null`. Operations that must not transmit unset
//! fields run the result through [`strip_unset`](crate::payments::codec::strip_unset).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NoxError, NoxResult};

/// Serialize `value` into a JSON object.
///
/// serde_json turns NaN and infinities into `null`, which would silently drop
/// the amount once unset fields are stripped, so they are rejected here.
fn to_object<T: Serialize>(value: &T, amount: Option<f64>) -> NoxResult<Map<String, Value>> {
    if let Some(amount) = amount.filter(|a| !a.is_finite()) {
        return Err(NoxError::invalid_payload(format!(
            "amount must be a finite number, got {}",
            amount
        )));
    }

    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(NoxError::invalid_payload("request did not encode to a JSON object")),
        Err(e) => Err(NoxError::invalid_payload(format!("Cannot encode request: {}", e))),
    }
}

/// V2 payment creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentData {
    /// Caller-side payment code
    pub code: String,
    pub amount: f64,
    pub webhook_url: Option<String>,
    pub client_name: Option<String>,
    pub client_document: Option<String>,
}

impl CreatePaymentData {
    pub fn new(code: impl Into<String>, amount: f64) -> Self {
        Self {
            code: code.into(),
            amount,
            webhook_url: None,
            client_name: None,
            client_document: None,
        }
    }

    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    pub fn client_document(mut self, document: impl Into<String>) -> Self {
        self.client_document = Some(document.into());
        self
    }

    pub fn to_wire(&self) -> NoxResult<Map<String, Value>> {
        to_object(self, Some(self.amount))
    }
}

pub const DEFAULT_CASH_OUT_TYPE: &str = "PIX_KEY";

/// V2 cash-out (PIX transfer) creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentCashOutData {
    pub code: String,
    pub pixkey: String,
    pub amount: f64,
    pub client_name: Option<String>,
    pub client_document: Option<String>,
    /// Kind of PIX key, `PIX_KEY` unless told otherwise
    #[serde(rename = "type")]
    pub key_type: String,
}

impl CreatePaymentCashOutData {
    pub fn new(code: impl Into<String>, pixkey: impl Into<String>, amount: f64) -> Self {
        Self {
            code: code.into(),
            pixkey: pixkey.into(),
            amount,
            client_name: None,
            client_document: None,
            key_type: DEFAULT_CASH_OUT_TYPE.to_string(),
        }
    }

    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    pub fn client_document(mut self, document: impl Into<String>) -> Self {
        self.client_document = Some(document.into());
        self
    }

    pub fn key_type(mut self, key_type: impl Into<String>) -> Self {
        self.key_type = key_type.into();
        self
    }

    pub fn to_wire(&self) -> NoxResult<Map<String, Value>> {
        to_object(self, Some(self.amount))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLinkData {
    pub description: String,
    pub amount: f64,
    pub reusable: bool,
}

impl PaymentLinkData {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
            reusable: false,
        }
    }

    pub fn reusable(mut self, reusable: bool) -> Self {
        self.reusable = reusable;
        self
    }

    pub fn to_wire(&self) -> NoxResult<Map<String, Value>> {
        to_object(self, Some(self.amount))
    }
}

/// Partial update of a payment link; only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkUpdate {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub reusable: Option<bool>,
    pub disable: Option<bool>,
    pub valid_until: Option<String>,
}

impl LinkUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn reusable(mut self, reusable: bool) -> Self {
        self.reusable = Some(reusable);
        self
    }

    pub fn disable(mut self, disable: bool) -> Self {
        self.disable = Some(disable);
        self
    }

    pub fn valid_until(mut self, valid_until: impl Into<String>) -> Self {
        self.valid_until = Some(valid_until.into());
        self
    }

    pub fn to_wire(&self) -> NoxResult<Map<String, Value>> {
        to_object(self, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::codec::strip_unset;
    use serde_json::json;

    #[test]
    fn test_cash_out_defaults_to_pix_key() {
        let data = CreatePaymentCashOutData::new("C1", "key@pix", 50.0);
        let wire = data.to_wire().unwrap();
        assert_eq!(wire["type"], json!("PIX_KEY"));
        // cash-outs are sent as-is, unset fields included
        assert_eq!(wire["client_name"], Value::Null);
        assert_eq!(wire.len(), 6);
    }

    #[test]
    fn test_create_payment_wire_after_filter() {
        let data = CreatePaymentData::new("P1", 10.0).client_name("Ana");
        let wire = strip_unset(data.to_wire().unwrap());
        assert_eq!(
            Value::Object(wire),
            json!({"code": "P1", "amount": 10.0, "client_name": "Ana"})
        );
    }

    #[test]
    fn test_link_defaults_not_reusable() {
        let wire = PaymentLinkData::new("Course", 99.9).to_wire().unwrap();
        assert_eq!(wire["reusable"], json!(false));
    }

    #[test]
    fn test_link_update_only_sends_set_fields() {
        let update = LinkUpdate::new().amount(20.0).disable(true);
        let wire = strip_unset(update.to_wire().unwrap());
        assert_eq!(Value::Object(wire), json!({"amount": 20.0, "disable": true}));
        assert!(strip_unset(LinkUpdate::new().to_wire().unwrap()).is_empty());
    }

    #[test]
    fn test_non_finite_amount_is_rejected() {
        let err = CreatePaymentData::new("P1", f64::NAN).to_wire().unwrap_err();
        assert!(matches!(err, NoxError::InvalidPayload { .. }));

        assert!(CreatePaymentCashOutData::new("C1", "k", f64::INFINITY)
            .to_wire()
            .is_err());
        assert!(PaymentLinkData::new("Course", f64::NAN).to_wire().is_err());
        assert!(LinkUpdate::new().amount(f64::NEG_INFINITY).to_wire().is_err());
        assert!(LinkUpdate::new().disable(true).to_wire().is_ok());
    }
}
