//! Backend clients
//!
//! Thin mappings from typed parameters onto the shared [`ApiClient`](super::ApiClient).

pub mod checkout;
pub mod payment_link;
pub mod v2;

pub use checkout::CheckoutClient;
pub use payment_link::PaymentLinkClient;
pub use v2::V2Client;
