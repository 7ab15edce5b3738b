//! Outgoing request descriptor
//!
//! An `ApiRequest` is plain data: method, path relative to the API base,
//! headers, and body. It is cloned for every attempt so the interceptor
//! pipeline always starts from what the caller built, and the `retried` flag
//! travels with the original across attempts.

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::error::{ApiError, Result};
use crate::query::QueryString;

/// Request body variants understood by the transport.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Bytes(Bytes),
    /// multipart/form-data; the transport generates the boundary
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        data: Bytes,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<&str>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                mime: mime.map(str::to_string),
                data: data.into(),
            },
        }
    }
}

/// Outgoing API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, including any query string
    pub path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// Set once the request has been through a refresh-and-retry cycle
    pub(crate) retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            retried: false,
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

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append an encoded query string to the path.
    pub fn query(mut self, query: &QueryString) -> Self {
        self.path.push_str(&query.encode());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("serializing JSON body: {e}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Raw payload with an explicit content type.
    pub fn bytes(mut self, content_type: &str, data: impl Into<Bytes>) -> Result<Self> {
        let value = HeaderValue::from_str(content_type)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid content type: {e}")))?;
        self.headers.insert(CONTENT_TYPE, value);
        self.body = RequestBody::Bytes(data.into());
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }
}
