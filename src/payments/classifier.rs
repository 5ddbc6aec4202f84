//! Maps a transport outcome onto the two reportable outbound error kinds.

use crate::error::{NoxError, NoxResult};
use crate::payments::codec::{RawResponse, TransportFailure};

/// Pass successful responses through; turn everything else into an error.
///
/// * no response at all -> [`NoxError::Transport`] with the failure description
/// * non-2xx response -> [`NoxError::Api`] carrying the raw body verbatim
pub fn classify(outcome: Result<RawResponse, TransportFailure>) -> NoxResult<RawResponse> {
    match outcome {
        Err(failure) => Err(NoxError::transport(failure.message)),
        Ok(response) if response.is_success() => Ok(response),
        Ok(response) => Err(NoxError::api(response.status, response.body_text())),
    }
}
