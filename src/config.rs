//! Environment-provided authentication configuration

use thiserror::Error;
use url::Url;

use crate::braids::{ClientId, ClientSecret, ClientSecretRef, SessionSecret, SessionSecretRef};

/// An error while assembling the authentication configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was not provided
    #[error("missing required configuration: {0}")]
    MissingVar(&'static str),
    /// A setting could not be parsed as a URL
    #[error("invalid value for {name}")]
    InvalidUrl {
        /// The name of the offending setting
        name: &'static str,
        /// The underlying parse error
        #[source]
        source: url::ParseError,
    },
}

/// Authentication configuration for the contacts application
///
/// Carries the IDP client credentials, the issuer the token endpoint is
/// derived from, the secret the host uses to protect its session storage,
/// and whether the `Host` header may be trusted when building absolute URLs
/// (required behind certain proxies).
#[derive(Clone, Debug)]
pub struct AuthConfig {
    client_id: ClientId,
    client_secret: Option<ClientSecret>,
    issuer: Url,
    token_url: Url,
    session_secret: SessionSecret,
    trust_host: bool,
}

impl AuthConfig {
    /// Creates a configuration for the given IDP client and issuer
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if a token endpoint cannot be
    /// derived from the issuer.
    pub fn new(
        client_id: impl Into<ClientId>,
        issuer: Url,
        session_secret: impl Into<SessionSecret>,
    ) -> Result<Self, ConfigError> {
        let token_url = derive_token_url(&issuer)?;
        Ok(Self {
            client_id: client_id.into(),
            client_secret: None,
            issuer,
            token_url,
            session_secret: session_secret.into(),
            trust_host: false,
        })
    }

    /// Creates a configuration from environment variables
    ///
    /// # Required
    /// - `IDP_CLIENT_ID`: the OAuth2 client ID
    /// - `IDP_ISSUER`: the IDP issuer URL
    /// - `SESSION_SECRET`: the host's session signing secret
    ///
    /// # Optional
    /// - `IDP_CLIENT_SECRET`: omitted for public IDP clients
    /// - `TRUST_HOST`: `"1"` or `"true"` to trust the `Host` header
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is absent or a URL is
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = std::env::var("IDP_CLIENT_ID")
            .map_err(|_| ConfigError::MissingVar("IDP_CLIENT_ID"))?;
        let issuer = std::env::var("IDP_ISSUER")
            .map_err(|_| ConfigError::MissingVar("IDP_ISSUER"))?
            .parse::<Url>()
            .map_err(|source| ConfigError::InvalidUrl {
                name: "IDP_ISSUER",
                source,
            })?;
        let session_secret = std::env::var("SESSION_SECRET")
            .map_err(|_| ConfigError::MissingVar("SESSION_SECRET"))?;

        let trust_host = matches!(
            std::env::var("TRUST_HOST").as_deref(),
            Ok("1") | Ok("true")
        );

        let mut config = Self::new(client_id, issuer, session_secret)?.with_trust_host(trust_host);
        if let Ok(secret) = std::env::var("IDP_CLIENT_SECRET") {
            config = config.with_client_secret(secret);
        }
        Ok(config)
    }

    /// Sets the client secret for a confidential IDP client
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<ClientSecret>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets whether the `Host` header may be trusted when building absolute
    /// URLs
    #[must_use]
    pub fn with_trust_host(mut self, trust_host: bool) -> Self {
        self.trust_host = trust_host;
        self
    }

    /// The OAuth2 client ID
    #[must_use]
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// The OAuth2 client secret, if the IDP client is confidential
    #[must_use]
    pub fn client_secret(&self) -> Option<&ClientSecretRef> {
        self.client_secret.as_deref()
    }

    /// The IDP issuer URL
    #[must_use]
    pub fn issuer(&self) -> &Url {
        &self.issuer
    }

    /// The IDP token endpoint, derived from the issuer
    #[must_use]
    pub fn token_url(&self) -> Url {
        self.token_url.clone()
    }

    /// The secret protecting the host's session storage
    #[must_use]
    pub fn session_secret(&self) -> &SessionSecretRef {
        &self.session_secret
    }

    /// Whether the `Host` header may be trusted
    #[must_use]
    pub fn trust_host(&self) -> bool {
        self.trust_host
    }
}

fn derive_token_url(issuer: &Url) -> Result<Url, ConfigError> {
    let base = issuer.as_str().trim_end_matches('/');
    format!("{base}/protocol/openid-connect/token")
        .parse()
        .map_err(|source| ConfigError::InvalidUrl {
            name: "IDP_ISSUER",
            source,
        })
}
