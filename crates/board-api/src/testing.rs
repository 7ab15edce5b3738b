//! Mock backend helpers shared by the endpoint tests

use std::sync::Arc;
use std::time::Duration;

use board_auth::MemoryTokenStore;
use board_http::{ApiClient, ClientConfig, RecordingNavigator};
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral port and return its base URL.
pub(crate) async fn serve(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    format!("http://{addr}")
}

/// Logged-in client pointed at `base_url`.
pub(crate) fn client(base_url: &str) -> ApiClient {
    ApiClient::new(
        ClientConfig::new(base_url).with_timeout(Duration::from_secs(2)),
        Arc::new(MemoryTokenStore::with_tokens("T1", "R1")),
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap()
}
