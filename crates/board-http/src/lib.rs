//! Resilient HTTP client core for the board API
//!
//! Every backend call goes through `ApiClient::send`, which runs the request
//! pipeline and then handles failures:
//! 1. `interceptor::Pipeline` attaches the bearer token and fixes multipart headers
//! 2. The request is transmitted with the client-wide timeout
//! 3. A failed attempt is classified by `classify::classify` (pure)
//! 4. 401s join the single-flight `refresh::RefreshCoordinator` and retry once
//! 5. Unrecoverable failures hand a `navigator::Redirect` to the `Navigator`
//!    and return `ApiError::Redirected`
//! 6. Everything else is returned to the caller unchanged
//!
//! Endpoint wrappers build `ApiRequest`s, call `send`, and unwrap the
//! `{success, data, message}` envelope with `ApiResponse::data`.

pub mod classify;
pub mod client;
pub mod download;
pub mod error;
pub mod interceptor;
pub mod message;
pub mod metrics;
pub mod navigator;
pub mod query;
pub mod refresh;
pub mod request;
pub mod response;

pub use classify::{Disposition, Failure, FailureContext, classify};
pub use client::{ApiClient, ClientConfig, DEFAULT_TIMEOUT};
pub use download::{Download, filename_from_content_disposition};
pub use error::{ApiError, Result};
pub use interceptor::{BearerAuth, Pipeline, RequestInterceptor, StripMultipartContentType};
pub use message::user_message;
pub use navigator::{Navigator, RecordingNavigator, Redirect, TracingNavigator};
pub use query::QueryString;
pub use refresh::{HttpRefresher, RefreshCoordinator, RefreshFailure, Refresher};
pub use request::{ApiRequest, FormPart, FormValue, RequestBody};
pub use response::{ApiResponse, Envelope};
