//! Authenticated API client
//!
//! `send` loops over attempts of one logical request. Each attempt starts
//! from a fresh copy of the caller's request, runs the interceptor pipeline,
//! and transmits. A 2xx ends the loop. Anything else is classified and the
//! disposition decides whether to return, navigate away, or go round again.
//! The `retried` flag caps the loop at two attempts for 401s.

use std::sync::Arc;
use std::time::{Duration, Instant};

use board_auth::{REFRESH_PATH, TokenStore};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, instrument, warn};

use crate::classify::{Disposition, Failure, FailureContext, classify};
use crate::download::Download;
use crate::error::{ApiError, Result};
use crate::interceptor::{Pipeline, RequestInterceptor, bearer_token};
use crate::metrics;
use crate::navigator::{Navigator, Redirect};
use crate::refresh::{HttpRefresher, RefreshCoordinator, Refresher};
use crate::request::{ApiRequest, FormPart, FormValue, RequestBody};
use crate::response::ApiResponse;

/// Timeout applied to every request unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for `ApiClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://boards.example.com/api`
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Outcome of one failed attempt.
enum AttemptError {
    /// Feed into the failure classifier
    Classify { failure: Failure, error: ApiError },
    /// Return to the caller without classification
    Abort(ApiError),
}

/// Shared request pipeline for all board API calls.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    pipeline: Pipeline,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    /// Build a client whose refresh calls go to `<base_url>/auth/refresh`
    /// on a separate, uninstrumented `reqwest::Client`.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let bare = build_http(config.timeout)?;
        let refresh_url = format!("{}{}", config.base_url.trim_end_matches('/'), REFRESH_PATH);
        let refresher = Arc::new(HttpRefresher::new(bare, refresh_url));
        Self::with_refresher(config, store, navigator, refresher)
    }

    /// Build a client with a custom refresher.
    pub fn with_refresher(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        refresher: Arc<dyn Refresher>,
    ) -> Result<Self> {
        let http = build_http(config.timeout)?;
        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs_f64(),
            "api client initialized"
        );
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            pipeline: Pipeline::standard(store.clone()),
            refresh: RefreshCoordinator::new(store.clone(), refresher),
            store,
            navigator,
        })
    }

    /// Append an interceptor after the standard ones.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.pipeline = self.pipeline.with(interceptor);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Absolute URL for a path relative to the API base.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request through the pipeline and failure handling.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
        self.execute(request, request_id).await
    }

    /// Send a request and keep the body as a named file.
    pub async fn download(&self, request: ApiRequest, fallback: Option<&str>) -> Result<Download> {
        let response = self.send(request).await?;
        Ok(Download::from_response(response, fallback))
    }

    #[instrument(
        skip_all,
        fields(request_id = %request_id, method = %request.method, path = %request.path)
    )]
    async fn execute(&self, mut request: ApiRequest, request_id: String) -> Result<ApiResponse> {
        loop {
            let mut prepared = request.clone();
            self.pipeline.apply(&mut prepared).await;
            let sent_token = bearer_token(&prepared.headers);

            let (failure, error) = match self.transmit(&prepared).await {
                Ok(response) => return Ok(response),
                Err(AttemptError::Abort(error)) => return Err(error),
                Err(AttemptError::Classify { failure, error }) => (failure, error),
            };

            let context = FailureContext {
                retried: request.retried,
                has_refresh_token: self.store.refresh_token().await.is_some(),
                token_rotated: self.token_rotated(sent_token.as_deref()).await,
            };
            let disposition = classify(failure, context);
            debug!(?failure, ?context, ?disposition, "attempt failed");

            match disposition {
                Disposition::PassThrough => return Err(error),
                Disposition::Maintenance => return Err(self.abandon(Redirect::Maintenance, error)),
                Disposition::Login { clear_tokens } => {
                    if clear_tokens {
                        if let Err(e) = self.store.clear().await {
                            warn!(error = %e, "failed to clear tokens");
                        }
                    }
                    return Err(self.abandon(Redirect::Login, error));
                }
                Disposition::RetryWithCurrentToken => {
                    request.retried = true;
                    debug!("token rotated by a concurrent refresh, retrying");
                }
                Disposition::Refresh => {
                    request.retried = true;
                    if let Err(e) = self.refresh.refresh().await {
                        return Err(self.abandon(Redirect::Login, ApiError::Refresh(e.0)));
                    }
                    debug!("token refreshed, retrying");
                }
            }
        }
    }

    async fn token_rotated(&self, sent: Option<&str>) -> bool {
        match self.store.access_token().await {
            Some(current) => sent != Some(current.as_str()),
            None => false,
        }
    }

    fn abandon(&self, target: Redirect, cause: ApiError) -> ApiError {
        warn!(target = %target, error = %cause, "abandoning request");
        metrics::record_redirect(target.label());
        self.navigator.navigate(target);
        ApiError::redirected(target, cause)
    }

    async fn transmit(
        &self,
        request: &ApiRequest,
    ) -> std::result::Result<ApiResponse, AttemptError> {
        let method = request.method.as_str();
        let builder = self.build(request).map_err(AttemptError::Abort)?;
        let started = Instant::now();

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_request(0, method, started.elapsed().as_secs_f64());
                return Err(transport_error(e));
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            AttemptError::Abort(if e.is_timeout() {
                ApiError::Timeout(e.to_string())
            } else {
                ApiError::Network(format!("reading response body: {e}"))
            })
        })?;
        metrics::record_request(status.as_u16(), method, started.elapsed().as_secs_f64());

        if status.is_success() {
            return Ok(ApiResponse::new(status, headers, body));
        }

        Err(AttemptError::Classify {
            failure: Failure::Status(status.as_u16()),
            error: ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            },
        })
    }

    fn build(&self, request: &ApiRequest) -> Result<reqwest::RequestBuilder> {
        let builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .headers(request.headers.clone());

        Ok(match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Bytes(data) => builder.body(data.clone()),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        })
    }
}

fn build_http(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ApiError::InvalidRequest(format!("building HTTP client: {e}")))
}

fn transport_error(e: reqwest::Error) -> AttemptError {
    if e.is_builder() {
        return AttemptError::Abort(ApiError::InvalidRequest(e.to_string()));
    }
    if e.is_timeout() {
        return AttemptError::Classify {
            failure: Failure::Timeout,
            error: ApiError::Timeout(e.to_string()),
        };
    }
    AttemptError::Classify {
        failure: Failure::NoResponse,
        error: ApiError::Network(e.to_string()),
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            FormValue::Text(value) => form.text(part.name.clone(), value.clone()),
            FormValue::File {
                file_name,
                mime,
                data,
            } => {
                let mut file = Part::bytes(data.to_vec()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file
                        .mime_str(mime)
                        .map_err(|e| ApiError::InvalidRequest(format!("invalid MIME type: {e}")))?;
                }
                form.part(part.name.clone(), file)
            }
        };
    }
    Ok(form)
}
