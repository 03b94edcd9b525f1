use crate::config::{Credentials, SessionConfig, SourceConfig};
use crate::session::{Session, SessionError, SessionResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Trait for anything that can hand out an authenticated session
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn authenticate(&self) -> SessionResult<Session>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Session provider backed by a persisted cookie file
///
/// # Flow
///
/// 1. If the session file exists (and no re-login was forced), load it
/// 2. Otherwise POST the configured credentials to `session/login`
/// 3. Let the session's cookie store take the response cookies, then save it
pub struct FileSessionProvider {
    path: PathBuf,
    credentials: Option<Credentials>,
    login_url: Url,
    user_agent: String,
    timeout: Duration,
    force_login: bool,
}

impl FileSessionProvider {
    pub fn new(session: &SessionConfig, source: &SourceConfig) -> SessionResult<Self> {
        Ok(Self {
            path: session.path.clone(),
            credentials: session.credentials.clone(),
            login_url: source.api_base_url()?.join("session/login")?,
            user_agent: source.user_agent.clone(),
            timeout: Duration::from_secs(source.timeout_secs),
            force_login: false,
        })
    }

    /// Ignores any saved session and logs in again
    pub fn force_login(mut self, force: bool) -> Self {
        self.force_login = force;
        self
    }

    async fn login(&self, credentials: &Credentials) -> SessionResult<Session> {
        tracing::info!("Logging in as {}", credentials.username);

        let session = Session::default();
        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .cookie_provider(session.cookie_provider())
            .build()?;

        let response = client
            .post(self.login_url.clone())
            .json(&LoginRequest {
                username: &credentials.username,
                email: &credentials.email,
                password: &credentials.password,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Login {
                status: status.as_u16(),
            });
        }

        if session.is_empty()? {
            return Err(SessionError::NoCookies);
        }

        Ok(session)
    }
}

#[async_trait]
impl SessionProvider for FileSessionProvider {
    async fn authenticate(&self) -> SessionResult<Session> {
        if !self.force_login && tokio::fs::try_exists(&self.path).await? {
            tracing::info!("Reusing saved session from {}", self.path.display());
            return Session::load(&self.path).await;
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(SessionError::MissingCredentials)?;

        let session = self.login(credentials).await?;
        session.save(&self.path).await?;
        tracing::info!("Saved new session to {}", self.path.display());

        Ok(session)
    }
}
