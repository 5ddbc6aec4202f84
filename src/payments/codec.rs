//! Request/response encoding shared by every backend client.
//!
//! Outbound requests are described by an [`OutboundRequest`] and encoded
//! into a transport-level [`HttpRequest`] against a backend's base address
//! and static headers. Response bodies are decoded into `serde_json::Value`.

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::Method;
use reqwest::Url;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{NoxError, NoxResult};

/// Name of the JSON part of a multipart body.
pub const DATA_PART: &str = "data";
/// Name of the optional binary part of a multipart body.
pub const FILE_PART: &str = "file";

/// Opaque binary attachment sent as the `file` part.
#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl FileAttachment {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            content_type: None,
        }
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn content_type(mut self, mime: impl Into<String>) -> Self {
        self.content_type = Some(mime.into());
        self
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// One JSON-encoded `data` part and at most one `file` part
    Multipart {
        data: Value,
        file: Option<FileAttachment>,
    },
}

/// A backend call before it is bound to a base address.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: RequestBody,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn json(mut self, value: impl Into<Value>) -> Self {
        self.body = RequestBody::Json(value.into());
        self
    }

    pub fn multipart(mut self, data: impl Into<Value>, file: Option<FileAttachment>) -> Self {
        self.body = RequestBody::Multipart {
            data: data.into(),
            file,
        };
        self
    }
}

#[derive(Debug, Clone)]
pub enum EncodedBody {
    Empty,
    Json(Bytes),
    Multipart {
        data: String,
        file: Option<FileAttachment>,
    },
}

/// A fully resolved request handed to a [`Transport`](crate::payments::traits::Transport).
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: EncodedBody,
}

/// Status and raw body of a response that was actually received.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The request never produced a response (connect, DNS, timeout, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportFailure {
    pub message: String,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Bind `request` to a backend address and encode its body.
///
/// Every non-multipart request carries `Content-Type: application/json`;
/// multipart requests leave the content type to the multipart encoder.
pub fn encode(
    request: OutboundRequest,
    base_url: &Url,
    static_headers: &HeaderMap,
) -> NoxResult<HttpRequest> {
    let mut url = resolve(base_url, &request.path)?;

    if !request.query.is_empty() {
        url.query_pairs_mut().extend_pairs(request.query.iter());
    }

    let mut headers = static_headers.clone();
    let body = match request.body {
        RequestBody::Empty => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            EncodedBody::Empty
        }
        RequestBody::Json(value) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            let bytes = serde_json::to_vec(&value)
                .map_err(|e| NoxError::invalid_payload(format!("Cannot encode body: {}", e)))?;
            EncodedBody::Json(Bytes::from(bytes))
        }
        RequestBody::Multipart { data, file } => {
            headers.remove(CONTENT_TYPE);
            let data = serde_json::to_string(&data)
                .map_err(|e| NoxError::invalid_payload(format!("Cannot encode data part: {}", e)))?;
            EncodedBody::Multipart { data, file }
        }
    };

    Ok(HttpRequest {
        method: request.method,
        url,
        headers,
        body,
    })
}

/// Resolve `path` under `base_url`, keeping any path prefix of the base.
///
/// `https://gw.test/noxpay` + `/account` gives `https://gw.test/noxpay/account`.
pub fn resolve(base_url: &Url, path: &str) -> NoxResult<Url> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let prefix = format!("{}/", base.path());
        base.set_path(&prefix);
    }

    base.join(path.trim_start_matches('/'))
        .map_err(|e| NoxError::config(format!("Invalid request path '{}': {}", path, e)))
}

pub fn decode(body: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Drop every field whose value is `null`.
pub fn strip_unset(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

/// Percent-encode a caller-supplied path parameter.
pub fn path_segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}
