//! OAuth token endpoint models and request helpers.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Environment, Error, Result};

/// OAuth scopes understood by the Helix endpoints this crate wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthScope {
    /// `analytics:read:extensions`
    AnalyticsReadExtensions,
    /// `analytics:read:games`
    AnalyticsReadGames,
    /// `bits:read`
    BitsRead,
    /// `channel:manage:broadcast`
    ChannelManageBroadcast,
    /// `channel:read:subscriptions`
    ChannelReadSubscriptions,
    /// `channel:read:redemptions`
    ChannelReadRedemptions,
    /// `chat:read`
    ChatRead,
    /// `chat:edit`
    ChatEdit,
    /// `moderator:read:followers`
    ModeratorReadFollowers,
    /// `user:edit`
    UserEdit,
    /// `user:read:email`
    UserReadEmail,
    /// `user:read:follows`
    UserReadFollows,
    /// `user:read:subscriptions`
    UserReadSubscriptions,
}

impl AuthScope {
    /// The scope string sent to the authorization endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScope::AnalyticsReadExtensions => "analytics:read:extensions",
            AuthScope::AnalyticsReadGames => "analytics:read:games",
            AuthScope::BitsRead => "bits:read",
            AuthScope::ChannelManageBroadcast => "channel:manage:broadcast",
            AuthScope::ChannelReadSubscriptions => "channel:read:subscriptions",
            AuthScope::ChannelReadRedemptions => "channel:read:redemptions",
            AuthScope::ChatRead => "chat:read",
            AuthScope::ChatEdit => "chat:edit",
            AuthScope::ModeratorReadFollowers => "moderator:read:followers",
            AuthScope::UserEdit => "user:edit",
            AuthScope::UserReadEmail => "user:read:email",
            AuthScope::UserReadFollows => "user:read:follows",
            AuthScope::UserReadSubscriptions => "user:read:subscriptions",
        }
    }
}

impl fmt::Display for AuthScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response to a `refresh_token` grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// The new access token
    pub access_token: String,
    /// The new refresh token; Twitch may rotate it on every refresh
    pub refresh_token: String,
    /// Seconds until the access token expires
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Scopes granted to the token
    #[serde(default)]
    pub scope: Vec<String>,
    /// Token type, normally `bearer`
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Response to an `authorization_code` grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCodeResponse {
    /// The user access token
    pub access_token: String,
    /// Refresh token for obtaining new access tokens
    pub refresh_token: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    /// Scopes granted to the token
    #[serde(default)]
    pub scope: Vec<String>,
    /// Token type, normally `bearer`
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Response of the token validation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateAccessTokenResponse {
    /// Client id the token was issued to
    pub client_id: String,
    /// Login of the token owner (absent for app tokens)
    #[serde(default)]
    pub login: Option<String>,
    /// User id of the token owner (absent for app tokens)
    #[serde(default)]
    pub user_id: Option<String>,
    /// Scopes granted to the token
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Seconds until the token expires
    pub expires_in: i64,
}

impl ValidateAccessTokenResponse {
    /// Absolute expiry computed from `expires_in`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.expires_in)
    }

    /// Returns `true` if the token carries the given scope.
    pub fn has_scope(&self, scope: AuthScope) -> bool {
        self.scopes.iter().any(|s| s == scope.as_str())
    }
}

/// Reject empty or whitespace-only parameters.
pub(crate) fn require_non_blank(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!(
            "The {} is not valid. It is not allowed to be empty or whitespace",
            name
        )));
    }
    Ok(())
}

/// POST a form to the OAuth token endpoint.
pub(crate) async fn post_token<T: DeserializeOwned>(
    http: &reqwest::Client,
    env: &Environment,
    params: &[(&str, &str)],
) -> Result<T> {
    let url = format!("{}/oauth2/token", env.auth_base_url());
    tracing::debug!(url = %url, "Requesting OAuth token");

    let response = http.post(&url).form(params).send().await?;

    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    // 400/401/403 mean the grant itself was rejected
    let status = status.as_u16();
    if status == 429 {
        return Err(Error::from_rate_limit_headers(response.headers()));
    }

    let body: serde_json::Value = response.json().await.unwrap_or_default();
    match status {
        400 | 401 | 403 => {
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            Err(Error::Authentication(format!(
                "Token exchange failed ({}): {}",
                status, message
            )))
        }
        _ => Err(Error::from_upstream_response(status, body)),
    }
}

/// Call the token validation endpoint. An invalid token yields `None`.
pub(crate) async fn validate(
    http: &reqwest::Client,
    env: &Environment,
    access_token: &str,
) -> Result<Option<ValidateAccessTokenResponse>> {
    let url = format!("{}/oauth2/validate", env.auth_base_url());

    let response = http
        .get(&url)
        .header("Authorization", format!("OAuth {}", access_token))
        .send()
        .await?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Ok(None);
    }
    if !status.is_success() {
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        return Err(Error::from_upstream_response(status.as_u16(), body));
    }

    Ok(Some(response.json().await?))
}
