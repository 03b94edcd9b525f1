//! Session module for authenticated access to the remote API
//!
//! A `Session` is the cookie jar the remote API filled at login. It is shared
//! with every reqwest client through `cookie_provider`, so cookies the server
//! sets, refreshes, or expires are applied by the cookie store itself. The
//! `FileSessionProvider` keeps the jar in a JSON file so that repeated runs
//! reuse the same session instead of logging in every time.

mod provider;

pub use provider::{FileSessionProvider, SessionProvider};

use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;
use std::path::Path;
use std::sync::{Arc, MutexGuard};
use thiserror::Error;
use url::Url;

/// Errors that can occur while obtaining a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error on session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cookie store error: {0}")]
    Store(String),

    #[error("No saved session and no credentials configured")]
    MissingCredentials,

    #[error("Login rejected with HTTP status {status}")]
    Login { status: u16 },

    #[error("Login response carried no session cookies")]
    NoCookies,

    #[error("Invalid login URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error during login: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Authenticated session state
///
/// Clones share one cookie jar.
#[derive(Clone)]
pub struct Session {
    store: Arc<CookieStoreMutex>,
}

impl Session {
    pub fn new(store: CookieStore) -> Self {
        Self {
            store: Arc::new(CookieStoreMutex::new(store)),
        }
    }

    /// The shared jar, for `ClientBuilder::cookie_provider`
    pub fn cookie_provider(&self) -> Arc<CookieStoreMutex> {
        Arc::clone(&self.store)
    }

    /// Applies a `Set-Cookie` header value as if `url` had sent it
    ///
    /// Returns false when the store rejected the value.
    pub fn store_set_cookie(&self, set_cookie: &str, url: &Url) -> SessionResult<bool> {
        let mut store = self.lock()?;
        Ok(store.parse(set_cookie, url).is_ok())
    }

    /// Value of the first live cookie with the given name
    pub fn cookie_value(&self, name: &str) -> SessionResult<Option<String>> {
        let store = self.lock()?;
        let value = store
            .iter_unexpired()
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_string());
        Ok(value)
    }

    /// True when the jar holds no live cookies
    pub fn is_empty(&self) -> SessionResult<bool> {
        Ok(self.lock()?.iter_unexpired().next().is_none())
    }

    pub async fn load(path: &Path) -> SessionResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let store = CookieStore::load_json(content.as_bytes())
            .map_err(|e| SessionError::Store(e.to_string()))?;
        Ok(Self::new(store))
    }

    /// Writes the jar to `path`, session cookies included
    pub async fn save(&self, path: &Path) -> SessionResult<()> {
        let mut content = Vec::new();
        self.lock()?
            .save_incl_expired_and_nonpersistent_json(&mut content)
            .map_err(|e| SessionError::Store(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    fn lock(&self) -> SessionResult<MutexGuard<'_, CookieStore>> {
        self.store
            .lock()
            .map_err(|_| SessionError::Store("cookie store lock poisoned".to_string()))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CookieStore::default())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
