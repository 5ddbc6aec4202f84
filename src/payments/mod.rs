//! Outbound API clients
//!
//! The checkout, payment-link and v2 backends share one request/response
//! contract: requests are encoded by [`codec`], sent over a [`Transport`],
//! and failures are classified by [`classifier`] into transport errors
//! (no response) or API errors (error-bearing response).

pub mod classifier;
pub mod client;
pub mod codec;
pub mod providers;
pub mod traits;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use codec::{FileAttachment, OutboundRequest};
pub use providers::{CheckoutClient, PaymentLinkClient, V2Client};
pub use traits::Transport;
pub use transport::ReqwestTransport;
pub use types::{CreatePaymentCashOutData, CreatePaymentData, LinkUpdate, PaymentLinkData};
