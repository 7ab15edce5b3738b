//! Request interceptor pipeline
//!
//! Interceptors run in order on a fresh copy of the request before every
//! attempt, including the retry after a token refresh. They never fail: an
//! interceptor that has nothing to add leaves the request untouched.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use board_auth::TokenStore;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{trace, warn};

use crate::request::ApiRequest;

/// Transform applied to every outgoing request.
///
/// Uses `Pin<Box<dyn Future>>` so pipelines can hold `Arc<dyn RequestInterceptor>`.
pub trait RequestInterceptor: Send + Sync {
    /// Name for trace logs
    fn name(&self) -> &str;

    fn intercept<'a>(
        &'a self,
        request: &'a mut ApiRequest,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Attaches `Authorization: Bearer <token>` when an access token is stored.
pub struct BearerAuth {
    store: Arc<dyn TokenStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

impl RequestInterceptor for BearerAuth {
    fn name(&self) -> &str {
        "bearer_auth"
    }

    fn intercept<'a>(
        &'a self,
        request: &'a mut ApiRequest,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let Some(token) = self.store.access_token().await else {
                return;
            };
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    request.headers.insert(AUTHORIZATION, value);
                }
                Err(e) => warn!(error = %e, "stored access token is not a valid header value"),
            }
        })
    }
}

/// Drops any preset `Content-Type` on multipart bodies so the transport can
/// write its own `multipart/form-data; boundary=...` header.
#[derive(Debug, Default)]
pub struct StripMultipartContentType;

impl RequestInterceptor for StripMultipartContentType {
    fn name(&self) -> &str {
        "strip_multipart_content_type"
    }

    fn intercept<'a>(
        &'a self,
        request: &'a mut ApiRequest,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if request.body.is_multipart() {
                request.headers.remove(CONTENT_TYPE);
            }
        })
    }
}

/// Ordered list of interceptors.
#[derive(Clone, Default)]
pub struct Pipeline {
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default pipeline: bearer token first, then multipart header cleanup.
    pub fn standard(store: Arc<dyn TokenStore>) -> Self {
        Self::new()
            .with(Arc::new(BearerAuth::new(store)))
            .with(Arc::new(StripMultipartContentType))
    }

    /// Append an interceptor; it runs after all existing ones.
    pub fn with(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Run every interceptor in order.
    pub async fn apply(&self, request: &mut ApiRequest) {
        for interceptor in &self.interceptors {
            trace!(interceptor = interceptor.name(), "applying request interceptor");
            interceptor.intercept(request).await;
        }
    }
}

/// Token carried by a prepared request's `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}
