//! Transport seam used by every backend client.

use crate::payments::codec::{HttpRequest, RawResponse, TransportFailure};
use async_trait::async_trait;

/// Sends a resolved request and returns whatever response came back.
///
/// Implementations must return `Ok` for every response that was received,
/// whatever its status, and `Err` only when no response exists at all.
/// Classification into API errors happens in the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportFailure>;
}
