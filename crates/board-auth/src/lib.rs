//! Credentials for the board API
//!
//! Holds the access/refresh token pair between requests and performs the two
//! unauthenticated calls that produce it:
//! 1. `token::login()` exchanges email + password for a pair at `LOGIN_PATH`
//! 2. The pair is persisted through a `TokenStore` (`set_tokens`)
//! 3. On a 401 the HTTP core calls `token::refresh_token()` at `REFRESH_PATH`
//! 4. The rotated pair replaces the old one, or both are cleared on failure
//!
//! Both calls use a plain `reqwest::Client` and never pass through the
//! authenticated request pipeline.

pub mod constants;
pub mod error;
pub mod store;
pub mod token;

pub use constants::*;
pub use error::{Error, Result};
pub use store::{FileTokenStore, MemoryTokenStore, StoredTokens, TokenStore};
pub use token::{TokenPair, login, refresh_token};
