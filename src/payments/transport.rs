//! reqwest-backed [`Transport`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::config::HttpSettings;
use crate::error::{NoxError, NoxResult};
use crate::payments::codec::{
    EncodedBody, FileAttachment, HttpRequest, RawResponse, TransportFailure, DATA_PART, FILE_PART,
};
use crate::payments::traits::Transport;

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(settings: &HttpSettings) -> NoxResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str())
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| NoxError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn file_part(file: FileAttachment) -> Result<Part, TransportFailure> {
    let mut part = Part::bytes(file.bytes.to_vec());
    if let Some(name) = file.file_name {
        part = part.file_name(name);
    }
    if let Some(mime) = file.content_type {
        part = part
            .mime_str(&mime)
            .map_err(|e| TransportFailure::new(format!("Invalid file content type: {}", e)))?;
    }
    Ok(part)
}

/// reqwest's `Display` omits the underlying cause (refused, dns, ...).
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportFailure> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        builder = match request.body {
            EncodedBody::Empty => builder,
            EncodedBody::Json(bytes) => builder.body(bytes),
            EncodedBody::Multipart { data, file } => {
                let mut form = Form::new().text(DATA_PART, data);
                if let Some(file) = file {
                    form = form.part(FILE_PART, file_part(file)?);
                }
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportFailure::new(describe(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportFailure::new(format!("Failed to read response body: {}", e)))?;

        Ok(RawResponse { status, body })
    }
}
