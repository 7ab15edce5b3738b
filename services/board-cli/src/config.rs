//! Configuration types and loading
//!
//! Config precedence: env vars > config file > defaults.
//! The password is loaded from BOARD_PASSWORD or password_file and is never
//! stored in the TOML directly.

use common::Secret;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Backend connection settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Where the token pair is persisted between runs
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

/// Login credentials
#[derive(Debug, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub email: Option<String>,
    /// Path to a file containing the password (alternative to BOARD_PASSWORD)
    #[serde(default)]
    pub password_file: Option<PathBuf>,
    #[serde(skip)]
    pub password: Option<Secret<String>>,
}

fn default_timeout() -> u64 {
    30
}

fn default_token_file() -> PathBuf {
    PathBuf::from(".board-tokens.json")
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Password resolution order:
    /// 1. BOARD_PASSWORD env var
    /// 2. password_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if let Ok(url) = std::env::var("BOARD_API_URL") {
            config.api.base_url = url;
        }

        let base_url = &config.api.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {base_url}"
            )));
        }

        if config.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if let Ok(password) = std::env::var("BOARD_PASSWORD") {
            config.auth.password = Some(Secret::new(password));
        } else if let Some(ref password_file) = config.auth.password_file {
            let password = std::fs::read_to_string(password_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read password_file {}: {e}",
                    password_file.display()
                ))
            })?;
            let password = password.trim_end_matches(['\r', '\n']).to_owned();
            if !password.is_empty() {
                config.auth.password = Some(Secret::new(password));
            }
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("board.toml")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that mutate environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn clear_overrides() {
        unsafe {
            remove_env("BOARD_API_URL");
            remove_env("BOARD_PASSWORD");
        }
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("board.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    const MINIMAL: &str = r#"
[api]
base_url = "https://boards.example.com/api"
"#;

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, MINIMAL);

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.base_url, "https://boards.example.com/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.storage.token_file, PathBuf::from(".board-tokens.json"));
        assert!(config.auth.email.is_none());
        assert!(config.auth.password.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let dir = tempfile::tempdir().unwrap();
        let password_path = dir.path().join("password");
        std::fs::write(&password_path, "hunter2\n").unwrap();
        let path = write_config(
            &dir,
            &format!(
                r#"
[api]
base_url = "http://localhost:4000/api"
timeout_secs = 5

[storage]
token_file = "/var/lib/board/tokens.json"

[auth]
email = "pm@example.com"
password_file = "{}"
"#,
                password_path.display()
            ),
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.storage.token_file, PathBuf::from("/var/lib/board/tokens.json"));
        assert_eq!(config.auth.email.as_deref(), Some("pm@example.com"));
        assert_eq!(config.auth.password.as_ref().unwrap().expose(), "hunter2");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/path/board.toml")).is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_base_url_env_override() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, MINIMAL);

        unsafe { set_env("BOARD_API_URL", "http://127.0.0.1:9000") };
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
        clear_overrides();
    }

    #[test]
    fn test_invalid_env_base_url_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, MINIMAL);

        unsafe { set_env("BOARD_API_URL", "boards.example.com") };
        let err = Config::load(&path).unwrap_err().to_string();
        clear_overrides();
        assert!(
            err.contains("base_url must start with http"),
            "error message should explain the issue, got: {err}"
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[api]
base_url = "https://boards.example.com/api"
timeout_secs = 0
"#,
        );

        assert!(Config::load(&path).is_err(), "timeout_secs = 0 must be rejected");
    }

    #[test]
    fn test_password_env_overrides_missing_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[api]
base_url = "https://boards.example.com/api"

[auth]
email = "pm@example.com"
password_file = "/nonexistent/password"
"#,
        );

        unsafe { set_env("BOARD_PASSWORD", "from-env") };
        let config = Config::load(&path).unwrap();
        clear_overrides();
        assert_eq!(config.auth.password.as_ref().unwrap().expose(), "from-env");
    }

    #[test]
    fn test_missing_password_file_returns_error() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[api]
base_url = "https://boards.example.com/api"

[auth]
password_file = "/nonexistent/password"
"#,
        );

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_resolve_path_precedence() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(Config::resolve_path(None), PathBuf::from("board.toml"));

        unsafe { set_env("CONFIG_PATH", "/env/board.toml") };
        assert_eq!(Config::resolve_path(None), PathBuf::from("/env/board.toml"));
        assert_eq!(
            Config::resolve_path(Some("/cli/board.toml")),
            PathBuf::from("/cli/board.toml"),
            "CLI arg must take precedence over CONFIG_PATH env var"
        );
        unsafe { remove_env("CONFIG_PATH") };
    }
}
