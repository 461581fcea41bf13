//! OAuth service for token exchange, refresh and validation.

use std::sync::Arc;

use secrecy::ExposeSecret;
use url::Url;

use crate::auth::{
    self, require_non_blank, AuthCodeResponse, AuthScope, RefreshResponse,
    ValidateAccessTokenResponse,
};
use crate::client::ClientInner;
use crate::Result;

/// Service for the OAuth endpoints on `id.twitch.tv`.
///
/// Calls that take an optional `client_id` fall back to the client id of
/// the session. The client secret must never be shipped to end users.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: twitch_helix_rs::HelixClient) -> twitch_helix_rs::Result<()> {
/// match client.auth().validate_access_token(None).await? {
///     Some(info) => println!("token valid for {}s", info.expires_in),
///     None => println!("token rejected"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct OAuthService {
    inner: Arc<ClientInner>,
}

impl OAuthService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    async fn resolve_client_id(&self, client_id: Option<&str>) -> Result<String> {
        let client_id = match client_id {
            Some(id) => id.to_string(),
            None => self.inner.session.client_id().await,
        };
        require_non_blank(&client_id, "client id")?;
        Ok(client_id)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// This does not touch the client's own session; use
    /// [`HelixClient::refresh_session`](crate::HelixClient::refresh_session)
    /// for that.
    pub async fn refresh_auth_token(
        &self,
        refresh_token: &str,
        client_secret: &str,
        client_id: Option<&str>,
    ) -> Result<RefreshResponse> {
        require_non_blank(refresh_token, "refresh token")?;
        require_non_blank(client_secret, "client secret")?;
        let client_id = self.resolve_client_id(client_id).await?;

        let env = self.inner.session.environment().await;
        auth::post_token(
            &self.inner.http,
            &env,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret),
            ],
        )
        .await
    }

    /// Exchange an authorization code for a user access token.
    ///
    /// `redirect_uri` must match the one used to obtain the code.
    pub async fn access_token_from_code(
        &self,
        code: &str,
        client_secret: &str,
        redirect_uri: &str,
        client_id: Option<&str>,
    ) -> Result<AuthCodeResponse> {
        require_non_blank(code, "code")?;
        require_non_blank(client_secret, "client secret")?;
        require_non_blank(redirect_uri, "redirect uri")?;
        let client_id = self.resolve_client_id(client_id).await?;

        let env = self.inner.session.environment().await;
        auth::post_token(
            &self.inner.http,
            &env,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret),
                ("redirect_uri", redirect_uri),
            ],
        )
        .await
    }

    /// Validate an access token, defaulting to the session's own token.
    ///
    /// Returns `None` if the token is invalid or expired.
    pub async fn validate_access_token(
        &self,
        access_token: Option<&str>,
    ) -> Result<Option<ValidateAccessTokenResponse>> {
        let env = self.inner.session.environment().await;
        match access_token {
            Some(token) => {
                require_non_blank(token, "access token")?;
                auth::validate(&self.inner.http, &env, token).await
            }
            None => {
                let token = self.inner.session.access_token().await;
                auth::validate(&self.inner.http, &env, token.expose_secret()).await
            }
        }
    }

    /// Build the URL a user visits to start the authorization code flow.
    ///
    /// `state` should be an unguessable value that is checked again when
    /// the user is redirected back.
    pub async fn authorization_code_url(
        &self,
        redirect_uri: &str,
        scopes: &[AuthScope],
        force_verify: bool,
        state: Option<&str>,
        client_id: Option<&str>,
    ) -> Result<Url> {
        require_non_blank(redirect_uri, "redirect uri")?;
        let client_id = self.resolve_client_id(client_id).await?;

        let scope = scopes
            .iter()
            .map(AuthScope::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        let env = self.inner.session.environment().await;
        let mut url = Url::parse(&format!("{}/oauth2/authorize", env.auth_base_url()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", &client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("scope", &scope)
                .append_pair("force_verify", if force_verify { "true" } else { "false" });
            if let Some(state) = state {
                pairs.append_pair("state", state);
            }
        }

        Ok(url)
    }
}
