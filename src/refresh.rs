//! The refresh exchange against the IDP's token endpoint
//!
//! The [`OidcRefreshClient`] performs a single form-encoded `refresh_token`
//! grant. It has no side effect beyond the outbound call; it returns a
//! [`RefreshedToken`] for the [`SessionGate`][crate::SessionGate] to apply to
//! the session's token record.

use async_trait::async_trait;
use thiserror::Error;

use crate::braids::{
    AccessToken, ClientId, ClientSecret, ClientSecretRef, RefreshToken, RefreshTokenRef,
};
use crate::clock::{Clock, DurationMillis, System, UnixMillis};

pub mod dto;

/// The credentials produced by a successful refresh exchange
#[derive(Debug)]
pub struct RefreshedToken {
    /// The replacement access token
    pub access_token: AccessToken,
    /// Absolute time after which the replacement token must not be used
    ///
    /// Anchored to the moment the response was received, not IDP issuance
    /// time, so the remaining lifetime is never over-counted.
    pub access_token_expires_at: UnixMillis,
    /// A rotated refresh token, if the IDP issued one
    pub refresh_token: Option<RefreshToken>,
}

/// An asynchronous exchange of a refresh token for fresh credentials
///
/// This is the seam between the session gate and the IDP; tests substitute
/// an implementation that never touches the network.
#[async_trait]
pub trait RefreshTokenExchange: Send + Sync {
    /// The error type returned when the exchange fails
    type Error: std::error::Error + Send + Sync + 'static;

    /// Exchanges `refresh_token` for a fresh set of credentials
    async fn refresh(
        &self,
        refresh_token: &RefreshTokenRef,
    ) -> Result<RefreshedToken, Self::Error>;
}

/// An error while attempting to refresh tokens against the authority
#[derive(Debug, Error)]
pub enum TokenRequestError {
    /// An error from the authority with an error body
    #[error("error requesting token from authority: {body}")]
    ErrorWithBody {
        /// The underlying request error
        source: reqwest::Error,
        /// The body of the error
        body: String,
    },
    /// Unable to deserialize the token body
    #[error("error deserializing token body from authority")]
    TokenBodyError(#[from] serde_json::Error),
    /// Unable to read the response
    #[error("error reading response body")]
    BodyReadError(reqwest::Error),
    /// Unable to send a token request to the authority
    #[error("error sending request to authority")]
    RequestSend(reqwest::Error),
}

/// A refresh client speaking the OIDC `refresh_token` grant over a
/// form-encoded POST
#[derive(Clone, Debug)]
pub struct OidcRefreshClient<C = System> {
    client: reqwest::Client,
    token_url: reqwest::Url,
    client_id: ClientId,
    client_secret: Option<ClientSecret>,
    clock: C,
}

impl OidcRefreshClient {
    /// Constructs a new refresh client
    ///
    /// `client_secret` is omitted from the exchange when the IDP client is
    /// public.
    pub fn new(
        client: reqwest::Client,
        token_url: reqwest::Url,
        client_id: ClientId,
        client_secret: Option<ClientSecret>,
    ) -> Self {
        Self {
            client,
            token_url,
            client_id,
            client_secret,
            clock: System,
        }
    }
}

impl<C> OidcRefreshClient<C> {
    /// Sets a custom clock to be used
    ///
    /// Useful for testing purposes
    pub fn with_clock<D>(self, clock: D) -> OidcRefreshClient<D> {
        OidcRefreshClient {
            client: self.client,
            token_url: self.token_url,
            client_id: self.client_id,
            client_secret: self.client_secret,
            clock,
        }
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> RefreshTokenExchange for OidcRefreshClient<C> {
    type Error = TokenRequestError;

    async fn refresh(
        &self,
        refresh_token: &RefreshTokenRef,
    ) -> Result<RefreshedToken, TokenRequestError> {
        request_refresh(
            &self.client,
            self.token_url.clone(),
            &self.client_id,
            self.client_secret.as_deref(),
            refresh_token,
            &self.clock,
        )
        .await
    }
}

#[tracing::instrument(
    err,
    skip_all,
    fields(
        token_url = %token_url,
        credentials.grant_type = "refresh_token",
        credentials.client_id = %client_id,
    ),
)]
async fn request_refresh<C: Clock>(
    client: &reqwest::Client,
    token_url: reqwest::Url,
    client_id: &ClientId,
    client_secret: Option<&ClientSecretRef>,
    refresh_token: &RefreshTokenRef,
    clock: &C,
) -> Result<RefreshedToken, TokenRequestError> {
    tracing::trace!("requesting refreshed token from authority");

    let grant = dto::RefreshTokenGrant {
        client_id,
        client_secret,
        refresh_token,
    };

    let resp = client
        .post(token_url)
        .form(&grant)
        .send()
        .await
        .map_err(TokenRequestError::RequestSend)?;

    tracing::debug!(
        response.status = resp.status().as_u16(),
        "received token response from issuing authority"
    );

    if let Err(error) = resp.error_for_status_ref() {
        let body = resp
            .text()
            .await
            .map_err(TokenRequestError::BodyReadError)?;
        return Err(TokenRequestError::ErrorWithBody { source: error, body });
    }

    let body = resp
        .bytes()
        .await
        .map_err(TokenRequestError::BodyReadError)?;
    let resp: dto::TokenResponse = serde_json::from_slice(&body)?;

    let access_token_expires_at = clock.now() + DurationMillis::from_secs(resp.expires_in);

    tracing::info!(
        has_refresh_token = resp.refresh_token.is_some(),
        expires_in = resp.expires_in,
        expires_at = access_token_expires_at.0,
        "received refreshed tokens"
    );

    if resp.refresh_token.is_some() {
        tracing::info!("received rotated refresh token");
    }

    Ok(RefreshedToken {
        access_token: (*resp.access_token).to_owned(),
        access_token_expires_at,
        refresh_token: resp.refresh_token.map(|rt| (*rt).to_owned()),
    })
}
