//! Token storage
//!
//! The access and refresh tokens are the only shared mutable state of the
//! client. Every store writes both values inside one lock acquisition, so a
//! reader never observes a new access token paired with an old refresh token.
//!
//! `FileTokenStore` persists `{"token": "...", "refreshToken": "..."}` with
//! atomic temp-file + rename writes; `MemoryTokenStore` is the in-process
//! equivalent used by tests and embedders that keep no state on disk.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::token::TokenPair;

/// Persisted token layout. Either key may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl StoredTokens {
    fn replace(&mut self, pair: TokenPair) {
        self.access = Some(pair.token);
        self.refresh = Some(pair.refresh_token);
    }

    fn clear(&mut self) {
        self.access = None;
        self.refresh = None;
    }
}

/// Credential storage consulted on every request.
///
/// Uses `Pin<Box<dyn Future>>` return types so the HTTP core can hold an
/// `Arc<dyn TokenStore>`.
pub trait TokenStore: Send + Sync {
    /// Current access token, if logged in.
    fn access_token(&self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>>;

    /// Current refresh token, if logged in.
    fn refresh_token(&self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>>;

    /// Replace both tokens with a freshly issued pair.
    fn set_tokens(&self, pair: TokenPair) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Remove both tokens.
    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// In-memory token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    state: Mutex<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a logged-in pair.
    pub fn with_tokens(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(StoredTokens {
                access: Some(access.into()),
                refresh: Some(refresh.into()),
            }),
        }
    }

    /// Store holding only an access token (no refresh possible).
    pub fn with_access_only(access: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(StoredTokens {
                access: Some(access.into()),
                refresh: None,
            }),
        }
    }

    /// Copy of both values as currently stored.
    pub async fn snapshot(&self) -> StoredTokens {
        self.state.lock().await.clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        Box::pin(async move { self.state.lock().await.access.clone() })
    }

    fn refresh_token(&self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        Box::pin(async move { self.state.lock().await.refresh.clone() })
    }

    fn set_tokens(&self, pair: TokenPair) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.state.lock().await.replace(pair);
            Ok(())
        })
    }

    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.state.lock().await.clear();
            Ok(())
        })
    }
}

/// Token store backed by a JSON file.
///
/// The Mutex serializes writes; reads clone the in-memory copy and never
/// touch the disk after `load`.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    state: Mutex<StoredTokens>,
}

impl FileTokenStore {
    /// Load tokens from `path`, creating an empty `{}` file on cold start.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading token file: {e}")))?;
            let tokens: StoredTokens = serde_json::from_str(&contents)
                .map_err(|e| Error::StoreParse(format!("parsing token file: {e}")))?;
            info!(
                path = %path.display(),
                logged_in = tokens.access.is_some(),
                "loaded token file"
            );
            tokens
        } else {
            info!(path = %path.display(), "token file not found, starting logged out");
            let tokens = StoredTokens::default();
            write_atomic(&path, &tokens).await?;
            tokens
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        Box::pin(async move { self.state.lock().await.access.clone() })
    }

    fn refresh_token(&self) -> Pin<Box<dyn Future<Output = Option<String>> + Send + '_>> {
        Box::pin(async move { self.state.lock().await.refresh.clone() })
    }

    fn set_tokens(&self, pair: TokenPair) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.replace(pair);
            debug!("stored rotated token pair");
            write_atomic(&self.path, &state).await
        })
    }

    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.clear();
            debug!("cleared tokens");
            write_atomic(&self.path, &state).await
        })
    }
}

/// Write tokens to a temp file in the same directory, then rename it over
/// the target. Permissions are 0600 on unix.
async fn write_atomic(path: &Path, tokens: &StoredTokens) -> Result<()> {
    let json = serde_json::to_string_pretty(tokens)
        .map_err(|e| Error::StoreParse(format!("serializing tokens: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("token path has no parent directory".into()))?;

    if !dir.as_os_str().is_empty() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::Io(format!("creating token directory: {e}")))?;
    }

    let tmp_path = dir.join(format!(".tokens.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp token file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting token file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp token file: {e}")))?;

    debug!(path = %path.display(), "persisted tokens");
    Ok(())
}
