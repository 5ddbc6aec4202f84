//! NoxPay SDK
//!
//! Clients for the NoxPay checkout, payment-link and v2 REST APIs, plus a
//! listener for the signed webhook callbacks the platform sends back.
//!
//! # Architecture
//!
//! ```text
//! caller ──▶ CheckoutClient / PaymentLinkClient / V2Client
//!                       │
//!                       ▼
//!                   ApiClient ──▶ codec::encode ──▶ Transport ──▶ backend
//!                       ▲                                │
//!                       └──── classifier ◀── response ───┘
//!
//! platform ──▶ WebhookServer ──▶ signature gate ──▶ WebhookEvent ──▶ handler / ack
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use noxpay_sdk::config::V2Config;
//! use noxpay_sdk::payments::{CreatePaymentData, V2Client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), noxpay_sdk::NoxError> {
//!     let client = V2Client::new(&V2Config::new("api-token", "signing-secret"))?;
//!     let payment = client
//!         .create_payment(&CreatePaymentData::new("ORDER-1", 49.9).client_name("Ana"))
//!         .await?;
//!     println!("{}", payment);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod payments;
pub mod webhook;

pub use error::{NoxError, NoxResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
