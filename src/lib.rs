//! Session and access-token lifecycle management for the Rolodex contacts
//! application
//!
//! A signed-in browser session holds one access token and one refresh token,
//! persisted between requests by the host's encrypted session storage. On
//! every incoming request the [`SessionGate`] inspects that state and decides
//! whether to reuse the access token, hold the request while it is refreshed
//! against the IDP, or surface a non-fatal refresh failure. Request handlers
//! only ever see the derived [`Session`], which never carries the refresh
//! token.
//!
//! The design goal is that a consumer of the session can never observe a
//! token that was known to be expired when the session was produced, while a
//! transient IDP outage degrades pages instead of evicting the user: a failed
//! refresh keeps the stale tokens, marks the session with
//! [`SessionError::RefreshAccessToken`], and the next request simply retries.
//!
//! # General flow
//!
//! ```
//! use rolodex_auth::{AuthConfig, OidcRefreshClient, SessionGate};
//!
//! # fn main() -> Result<(), rolodex_auth::ConfigError> {
//! let config = AuthConfig::new(
//!     "contacts-web",
//!     "https://idp.example/realms/rolodex".parse().unwrap(),
//!     "session-signing-secret",
//! )?;
//!
//! let refresher = OidcRefreshClient::new(
//!     reqwest::Client::new(),
//!     config.token_url(),
//!     config.client_id().clone(),
//!     config.client_secret().map(|s| s.to_owned()),
//! );
//!
//! // One gate serves every request; session state is threaded through
//! // `resolve` explicitly rather than living in ambient globals.
//! let gate = SessionGate::new(refresher);
//! # let _ = gate;
//! # Ok(())
//! # }
//! ```
//!
//! Within a request handler, the state read from session storage resolves to
//! the session for that request:
//!
//! ```ignore
//! let session = gate.resolve(state.as_mut()).await;
//! let contacts = contacts_client.list_or_empty(session.as_ref()).await;
//! ```
//!
//! Concurrent requests from the same user are resolved independently; two
//! requests arriving at expiry may both refresh, and the last persisted
//! result wins. This relies on the IDP's refresh-token leeway and is not
//! serialized here.

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod braids;
pub mod clock;
pub mod config;
pub mod contacts;
mod gate;
mod record;
pub mod redirect;
pub mod refresh;
mod session;

pub use braids::*;
pub use config::{AuthConfig, ConfigError};
pub use gate::SessionGate;
pub use record::{LastError, TokenRecord, TokenStatus};
pub use refresh::dto::InitialGrant;
pub use refresh::{OidcRefreshClient, RefreshTokenExchange, RefreshedToken, TokenRequestError};
pub use session::{Session, SessionError, SessionState, UserClaims};
