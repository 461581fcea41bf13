//! Session management for Helix API authentication.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::token::{self, RefreshResponse};
use crate::{Environment, Error, Result};

/// Authentication session for the Helix API.
///
/// The session holds the client id and access token sent with every
/// request. Sessions created from a refresh token can renew their access
/// token; sessions created from a bare token rely on the caller to supply a
/// new one through [`set_access_token`](Self::set_access_token).
///
/// # Thread Safety
///
/// `Session` is cheap to clone and safe to share across tasks. It uses
/// internal locking to manage token refresh.
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<SessionInner>>,
}

struct SessionInner {
    env: Environment,
    client_id: String,
    access_token: SecretString,
    expires_at: Option<DateTime<Utc>>,
    refresh_token: Option<SecretString>,
    client_secret: Option<SecretString>,
    scopes: Vec<String>,
}

impl Session {
    /// Create a session from an existing access token.
    ///
    /// The token's lifetime is unknown, so the session never considers
    /// itself expiring. Call [`set_access_token`](Self::set_access_token)
    /// after obtaining a new token elsewhere.
    ///
    /// # Example
    ///
    /// ```
    /// use twitch_helix_rs::{Session, Environment};
    ///
    /// let session = Session::new("my-client-id", "my-access-token", Environment::Production);
    /// ```
    pub fn new(
        client_id: impl Into<String>,
        access_token: impl Into<String>,
        env: Environment,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner {
                env,
                client_id: client_id.into(),
                access_token: SecretString::from(access_token.into()),
                expires_at: None,
                refresh_token: None,
                client_secret: None,
                scopes: Vec::new(),
            })),
        }
    }

    /// Create a session by exchanging a refresh token.
    ///
    /// The session keeps the client secret and refresh token so it can renew
    /// the access token itself.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use twitch_helix_rs::{Session, Environment};
    ///
    /// # async fn example() -> twitch_helix_rs::Result<()> {
    /// let session = Session::from_refresh_token(
    ///     std::env::var("TWITCH_CLIENT_ID").unwrap(),
    ///     std::env::var("TWITCH_CLIENT_SECRET").unwrap(),
    ///     std::env::var("TWITCH_REFRESH_TOKEN").unwrap(),
    ///     Environment::Production,
    /// ).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn from_refresh_token(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
        env: Environment,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = SecretString::from(client_secret.into());
        let refresh_token = SecretString::from(refresh_token.into());

        let response =
            Self::exchange_token(&client_id, &client_secret, &refresh_token, &env).await?;

        Ok(Self {
            inner: Arc::new(RwLock::new(SessionInner {
                env,
                client_id,
                access_token: SecretString::from(response.access_token),
                expires_at: response
                    .expires_in
                    .map(|secs| Utc::now() + Duration::seconds(secs)),
                refresh_token: Some(SecretString::from(response.refresh_token)),
                client_secret: Some(client_secret),
                scopes: response.scope,
            })),
        })
    }

    /// Check if the access token is known to have expired.
    pub async fn is_expired(&self) -> bool {
        let inner = self.inner.read().await;
        inner.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    /// Check if the access token will expire within the given buffer period.
    ///
    /// Tokens without a known expiry never report as expiring.
    pub async fn expires_within(&self, buffer: Duration) -> bool {
        let inner = self.inner.read().await;
        inner.expires_at.is_some_and(|at| Utc::now() + buffer >= at)
    }

    /// Get the access token expiration time, if known.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.expires_at
    }

    /// Returns `true` if the session holds credentials to refresh itself.
    pub async fn can_refresh(&self) -> bool {
        let inner = self.inner.read().await;
        inner.refresh_token.is_some() && inner.client_secret.is_some()
    }

    /// Refresh the access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionExpired`] if the session has no refresh
    /// credentials, or an authentication error if the exchange fails.
    pub async fn refresh(&self) -> Result<()> {
        let mut inner = self.inner.write().await;

        let (Some(client_secret), Some(refresh_token)) =
            (&inner.client_secret, &inner.refresh_token)
        else {
            return Err(Error::SessionExpired);
        };

        let response =
            Self::exchange_token(&inner.client_id, client_secret, refresh_token, &inner.env)
                .await?;

        inner.access_token = SecretString::from(response.access_token);
        inner.expires_at = response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        inner.refresh_token = Some(SecretString::from(response.refresh_token));
        inner.scopes = response.scope;

        tracing::debug!("Access token refreshed");
        Ok(())
    }

    /// Replace the access token, e.g. after refreshing it out of band.
    pub async fn set_access_token(&self, access_token: impl Into<String>, expires_in: Option<i64>) {
        let mut inner = self.inner.write().await;
        inner.access_token = SecretString::from(access_token.into());
        inner.expires_at = expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
    }

    /// Get the current access token.
    ///
    /// This method does not check expiry; the client refreshes before
    /// requests when configured to.
    pub(crate) async fn access_token(&self) -> SecretString {
        self.inner.read().await.access_token.clone()
    }

    /// Get the client id requests are sent with.
    pub async fn client_id(&self) -> String {
        self.inner.read().await.client_id.clone()
    }

    /// Get the environment this session is bound to.
    pub async fn environment(&self) -> Environment {
        self.inner.read().await.env.clone()
    }

    /// Scopes reported by the last token exchange.
    pub async fn scopes(&self) -> Vec<String> {
        self.inner.read().await.scopes.clone()
    }

    async fn exchange_token(
        client_id: &str,
        client_secret: &SecretString,
        refresh_token: &SecretString,
        env: &Environment,
    ) -> Result<RefreshResponse> {
        let http = reqwest::Client::new();
        token::post_token(
            &http,
            env,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.expose_secret()),
                ("client_id", client_id),
                ("client_secret", client_secret.expose_secret()),
            ],
        )
        .await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("env", &"...")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &"...")
            .finish()
    }
}
