//! Inbound webhook channel
//!
//! The platform pushes payment-status changes as signed JSON callbacks.
//! [`signature`] and [`event`] are pure and always available; the HTTP(S)
//! listener lives behind the `server` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use noxpay_sdk::webhook::WebhookServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), noxpay_sdk::NoxError> {
//!     let mut server = WebhookServer::new("signing-secret");
//!     server.start("0.0.0.0", 8080, None).await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.stop().await
//! }
//! ```

pub mod event;
#[cfg(feature = "server")]
pub mod handler;
#[cfg(feature = "server")]
pub mod server;
pub mod signature;
#[cfg(feature = "server")]
pub mod tls;

pub use event::WebhookEvent;
#[cfg(feature = "server")]
pub use handler::{WebhookHandler, WebhookState};
#[cfg(feature = "server")]
pub use server::WebhookServer;
