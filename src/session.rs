use std::fmt;

use serde::{Deserialize, Serialize};

use crate::braids::AccessToken;
use crate::record::{LastError, TokenRecord};

/// Identity claims captured from the IDP at sign-in
///
/// Carried unchanged for the life of the session; a refresh never rewrites
/// them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// The subject identifier
    pub sub: String,
    /// The preferred username of the user
    pub preferred_username: String,
    /// The email address of the user, if released by the IDP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The state persisted in the host's encrypted session storage between
/// requests
///
/// Owned exclusively by the [`SessionGate`][crate::SessionGate] for the
/// duration of a request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    /// The identity claims from the original sign-in
    pub user: UserClaims,
    /// The session's credential state
    pub tokens: TokenRecord,
}

/// A non-fatal authentication error surfaced on the session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionError {
    /// The most recent attempt to refresh the access token failed; the
    /// session still carries the stale token and the next request retries
    #[serde(rename = "RefreshAccessTokenError")]
    RefreshAccessToken,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::RefreshAccessToken => f.write_str("RefreshAccessTokenError"),
        }
    }
}

/// The request-scoped, externally visible projection of a session
///
/// This is the only authentication state request handlers may read. It never
/// contains the refresh token, and must be re-derived on every request rather
/// than cached.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    /// The identity claims from the original sign-in
    pub user: UserClaims,
    /// The bearer credential for the contacts API
    ///
    /// Guaranteed unexpired only at the time the session was produced.
    pub access_token: AccessToken,
    /// A non-fatal error from the most recent refresh attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,
}

impl Session {
    /// Derives the session from the resolved state of the current request
    pub(crate) fn project(state: &SessionState) -> Self {
        Self {
            user: state.user.clone(),
            access_token: state.tokens.access_token().to_owned(),
            error: match state.tokens.last_error() {
                Some(LastError::RefreshFailed) => Some(SessionError::RefreshAccessToken),
                None => None,
            },
        }
    }
}
