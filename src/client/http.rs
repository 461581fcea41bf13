//! HTTP client implementation for the Helix API.

use chrono::Duration;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::api::{ChannelsService, OAuthService, SubscriptionsService, UsersService};
use crate::auth::Session;
use crate::{Environment, Error, Result};

use super::config::ClientConfig;

/// The main client for interacting with the Helix API.
///
/// This client provides access to the API through service structs. It
/// manages authentication headers, request building and response parsing.
/// Cloning is cheap and clones share one connection pool and session.
///
/// # Example
///
/// ```no_run
/// use twitch_helix_rs::{HelixClient, Environment};
///
/// # async fn example() -> twitch_helix_rs::Result<()> {
/// let client = HelixClient::from_refresh_token(
///     "your-client-id",
///     "your-client-secret",
///     "your-refresh-token",
///     Environment::Production,
/// ).await?;
///
/// let users = client.users().get_by_logins(&["twitchdev"]).await?;
/// if let Some(user) = users.first() {
///     let channel = client.channels().get(&user.id).await?;
///     println!("{:?}", channel.map(|c| c.title));
/// }
/// # Ok(())
/// # }
/// ```
pub struct HelixClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) session: Session,
    pub(crate) config: ClientConfig,
}

impl HelixClient {
    /// Create a client from an existing access token.
    pub fn from_token(
        client_id: impl Into<String>,
        access_token: impl Into<String>,
        env: Environment,
    ) -> Result<Self> {
        Self::with_session(Session::new(client_id, access_token, env), ClientConfig::default())
    }

    /// Create a client by exchanging a refresh token.
    ///
    /// The resulting client refreshes its access token automatically.
    pub async fn from_refresh_token(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
        env: Environment,
    ) -> Result<Self> {
        let session =
            Session::from_refresh_token(client_id, client_secret, refresh_token, env).await?;
        Self::with_session(session, ClientConfig::default())
    }

    /// Create a new client with an existing session and custom configuration.
    pub fn with_session(session: Session, config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                session,
                config,
            }),
        })
    }

    /// Get the OAuth service.
    pub fn auth(&self) -> OAuthService {
        OAuthService::new(self.inner.clone())
    }

    /// Get the channels service.
    pub fn channels(&self) -> ChannelsService {
        ChannelsService::new(self.inner.clone())
    }

    /// Get the subscriptions service.
    pub fn subscriptions(&self) -> SubscriptionsService {
        SubscriptionsService::new(self.inner.clone())
    }

    /// Get the users and follows service.
    pub fn users(&self) -> UsersService {
        UsersService::new(self.inner.clone())
    }

    /// Manually refresh the session token.
    pub async fn refresh_session(&self) -> Result<()> {
        self.inner.session.refresh().await
    }

    /// Get the current environment.
    pub async fn environment(&self) -> Environment {
        self.inner.session.environment().await
    }

    /// Get a reference to the session.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }
}

impl ClientInner {
    /// Get the base URL for Helix requests.
    pub(crate) async fn base_url(&self) -> String {
        self.session.environment().await.api_base_url().to_string()
    }

    /// Refresh the session first if it is about to expire.
    pub(crate) async fn ensure_session_valid(&self) -> Result<()> {
        if self.config.auto_refresh_session && self.session.can_refresh().await {
            let buffer = Duration::seconds(self.config.refresh_buffer_secs);
            if self.session.expires_within(buffer).await {
                self.session.refresh().await?;
            }
        }
        Ok(())
    }

    /// Build request headers with authentication.
    pub(crate) async fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let token = self.session.access_token().await;
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| Error::InvalidArgument("Invalid token format".to_string()))?,
        );

        let client_id = self.session.client_id().await;
        headers.insert(
            "Client-Id",
            HeaderValue::from_str(&client_id)
                .map_err(|_| Error::InvalidArgument("Invalid client id".to_string()))?,
        );

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    /// Make a GET request with query parameters.
    ///
    /// Helix repeats keys for list parameters (`?user_id=1&user_id=2`), so
    /// callers usually pass a slice of key/value pairs.
    pub(crate) async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        self.ensure_session_valid().await?;

        let url = format!("{}{}", self.base_url().await, path);
        let headers = self.build_headers().await?;

        tracing::debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .headers(headers)
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle an API response.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let status_code = status.as_u16();

        if status_code == 429 {
            return Err(Error::from_rate_limit_headers(response.headers()));
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from);

        match status_code {
            401 => Err(Error::Authentication(
                message.unwrap_or_else(|| "Invalid or expired access token".to_string()),
            )),
            404 => Err(Error::NotFound(
                message.unwrap_or_else(|| "Resource not found".to_string()),
            )),
            _ => Err(Error::from_upstream_response(status_code, body)),
        }
    }
}

impl Clone for HelixClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for HelixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelixClient")
            .field("config", &self.inner.config)
            .finish()
    }
}
