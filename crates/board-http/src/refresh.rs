//! Single-flight token refresh
//!
//! At most one refresh call is outstanding at any time. The first caller
//! creates a shared future and parks it in `inflight`; every caller arriving
//! while it is parked awaits a clone of the same future and receives the same
//! result. Whoever finishes first clears the slot, but only if it still holds
//! the generation that caller joined, so a late finisher can never evict a
//! newer cycle.
//!
//! The refresh itself is one critical section over the token store: read the
//! refresh token, call the endpoint, then write both rotated tokens on
//! success or clear both on failure.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use board_auth::{TokenPair, TokenStore};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tracing::{debug, info, warn};

use crate::metrics;

/// Performs the network half of a refresh.
///
/// Must not route through the authenticated client: a 401 from the refresh
/// endpoint would otherwise re-enter the refresh protocol.
pub trait Refresher: Send + Sync {
    fn refresh(
        &self,
        refresh_token: String,
    ) -> Pin<Box<dyn Future<Output = board_auth::Result<TokenPair>> + Send + 'static>>;
}

/// Refresher backed by a bare `reqwest::Client`.
pub struct HttpRefresher {
    client: reqwest::Client,
    url: String,
}

impl HttpRefresher {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl Refresher for HttpRefresher {
    fn refresh(
        &self,
        refresh_token: String,
    ) -> Pin<Box<dyn Future<Output = board_auth::Result<TokenPair>> + Send + 'static>> {
        let client = self.client.clone();
        let url = self.url.clone();
        Box::pin(async move { board_auth::refresh_token(&client, &url, &refresh_token).await })
    }
}

/// Why a refresh cycle failed. Cloneable so every waiter gets a copy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RefreshFailure(pub String);

type SharedRefresh = Shared<BoxFuture<'static, Result<TokenPair, RefreshFailure>>>;

/// Coordinates refreshes so concurrent 401s share one network call.
pub struct RefreshCoordinator {
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn Refresher>,
    inflight: Mutex<Option<(u64, SharedRefresh)>>,
    generation: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<dyn TokenStore>, refresher: Arc<dyn Refresher>) -> Self {
        Self {
            store,
            refresher,
            inflight: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Join the in-flight refresh or start one, and wait for its outcome.
    pub async fn refresh(&self) -> Result<TokenPair, RefreshFailure> {
        let (generation, cycle) = self.join_or_start();
        let outcome = cycle.await;
        self.finish(generation);
        outcome
    }

    /// Whether a refresh cycle is currently parked.
    pub fn in_flight(&self) -> bool {
        self.slot().is_some()
    }

    fn slot(&self) -> MutexGuard<'_, Option<(u64, SharedRefresh)>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn join_or_start(&self) -> (u64, SharedRefresh) {
        let mut slot = self.slot();
        if let Some((generation, cycle)) = slot.as_ref() {
            debug!(generation, "joining in-flight token refresh");
            return (*generation, cycle.clone());
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(generation, "starting token refresh");
        let cycle = run_cycle(self.store.clone(), self.refresher.clone())
            .boxed()
            .shared();
        *slot = Some((generation, cycle.clone()));
        (generation, cycle)
    }

    fn finish(&self, generation: u64) {
        let mut slot = self.slot();
        if matches!(slot.as_ref(), Some((current, _)) if *current == generation) {
            *slot = None;
        }
    }
}

async fn run_cycle(
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn Refresher>,
) -> Result<TokenPair, RefreshFailure> {
    let Some(refresh_token) = store.refresh_token().await else {
        metrics::record_refresh("skipped");
        return Err(RefreshFailure("no refresh token stored".into()));
    };

    match refresher.refresh(refresh_token).await {
        Ok(pair) => {
            if let Err(e) = store.set_tokens(pair.clone()).await {
                warn!(error = %e, "failed to persist refreshed tokens");
            }
            metrics::record_refresh("success");
            info!("token refresh succeeded");
            Ok(pair)
        }
        Err(e) => {
            warn!(error = %e, "token refresh failed, clearing credentials");
            if let Err(clear_err) = store.clear().await {
                warn!(error = %clear_err, "failed to clear tokens after refresh failure");
            }
            metrics::record_refresh("failure");
            Err(RefreshFailure(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_auth::{MemoryTokenStore, StoredTokens};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Refresher that takes 50ms and hands out `T<n>`/`R<n>` for call n,
    /// or fails every call when `fail` is set.
    #[derive(Default)]
    struct CountingRefresher {
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Refresher for Arc<CountingRefresher> {
        fn refresh(
            &self,
            refresh_token: String,
        ) -> Pin<Box<dyn Future<Output = board_auth::Result<TokenPair>> + Send + 'static>> {
            let this = self.clone();
            Box::pin(async move {
                let n = this.calls.fetch_add(1, Ordering::SeqCst) + 1;
                this.seen.lock().unwrap().push(refresh_token);
                tokio::time::sleep(Duration::from_millis(50)).await;
                if this.fail {
                    Err(board_auth::Error::InvalidCredentials("revoked".into()))
                } else {
                    Ok(TokenPair::new(format!("T{}", n + 1), format!("R{}", n + 1)))
                }
            })
        }
    }

    fn coordinator(
        store: Arc<MemoryTokenStore>,
        refresher: Arc<CountingRefresher>,
    ) -> Arc<RefreshCoordinator> {
        Arc::new(RefreshCoordinator::new(store, Arc::new(refresher)))
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_refresh() {
        let store = Arc::new(MemoryTokenStore::with_tokens("T1", "R1"));
        let refresher = Arc::new(CountingRefresher::default());
        let coordinator = coordinator(store.clone(), refresher.clone());

        let mut handles = vec![];
        for _ in 0..5 {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move { coordinator.refresh().await }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap(), TokenPair::new("T2", "R2"));
        }

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*refresher.seen.lock().unwrap(), vec!["R1".to_string()]);
        assert!(!coordinator.in_flight(), "slot must be cleared after completion");
    }

    #[tokio::test(start_paused = true)]
    async fn success_rotates_both_tokens() {
        let store = Arc::new(MemoryTokenStore::with_tokens("T1", "R1"));
        let refresher = Arc::new(CountingRefresher::default());
        let coordinator = coordinator(store.clone(), refresher);

        coordinator.refresh().await.unwrap();

        assert_eq!(
            store.snapshot().await,
            StoredTokens {
                access: Some("T2".into()),
                refresh: Some("R2".into()),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_refreshes_start_new_cycles() {
        let store = Arc::new(MemoryTokenStore::with_tokens("T1", "R1"));
        let refresher = Arc::new(CountingRefresher::default());
        let coordinator = coordinator(store.clone(), refresher.clone());

        coordinator.refresh().await.unwrap();
        let second = coordinator.refresh().await.unwrap();

        assert_eq!(second, TokenPair::new("T3", "R3"));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            *refresher.seen.lock().unwrap(),
            vec!["R1".to_string(), "R2".to_string()],
            "second cycle must use the rotated refresh token"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failure_clears_tokens_for_every_waiter() {
        let store = Arc::new(MemoryTokenStore::with_tokens("T1", "R1"));
        let refresher = Arc::new(CountingRefresher {
            fail: true,
            ..Default::default()
        });
        let coordinator = coordinator(store.clone(), refresher.clone());

        let (a, b) = tokio::join!(coordinator.refresh(), coordinator.refresh());

        assert!(a.is_err());
        assert_eq!(a, b);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.snapshot().await, StoredTokens::default());
        assert!(!coordinator.in_flight());
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_without_network_call() {
        let store = Arc::new(MemoryTokenStore::with_access_only("T1"));
        let refresher = Arc::new(CountingRefresher::default());
        let coordinator = coordinator(store, refresher.clone());

        let err = coordinator.refresh().await.unwrap_err();

        assert!(err.to_string().contains("no refresh token"));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }
}
