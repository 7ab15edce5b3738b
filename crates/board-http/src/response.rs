//! Successful responses and the `{success, data, message}` envelope

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Result};

/// Standard backend envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Payload of a successful envelope.
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(ApiError::Rejected {
                message: self.message,
            });
        }
        self.data
            .ok_or_else(|| ApiError::Decode("envelope has no data".into()))
    }
}

/// 2xx response with its body fully read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Decode the body as `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Decode the body as an envelope without unwrapping it.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<Envelope<T>> {
        self.json()
    }

    /// Decode the envelope and return its `data`.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        self.envelope::<T>()?.into_data()
    }
}
