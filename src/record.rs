use serde::{Deserialize, Serialize};

use crate::braids::{AccessToken, AccessTokenRef, RefreshToken, RefreshTokenRef};
use crate::clock::{Clock, UnixMillis};
use crate::refresh::dto::InitialGrant;
use crate::refresh::RefreshedToken;

/// The authoritative credential state for one user session
///
/// A record is created from the IDP's initial grant at sign-in, persisted by
/// the host's encrypted session storage between requests, and mutated only by
/// the [`SessionGate`][crate::SessionGate]. The refresh token it carries is
/// never exposed outside this crate's types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenRecord {
    access_token: AccessToken,
    refresh_token: RefreshToken,
    access_token_expires_at: UnixMillis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_error: Option<LastError>,
}

/// The outcome of the most recent refresh attempt, when it failed
///
/// A recorded failure does not invalidate the stale tokens; the next request
/// retries the refresh with them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastError {
    /// The IDP rejected the refresh token, the exchange errored, or the
    /// response body could not be understood
    RefreshFailed,
}

/// A token's lifecycle status
#[derive(Debug)]
pub enum TokenStatus {
    /// The token is valid and may be used as-is
    Fresh,
    /// The token must not be used until it has been refreshed
    Expired,
}

impl TokenRecord {
    /// Populates a record from the IDP's initial token grant
    ///
    /// The grant reports its expiry in whole epoch seconds; the record stores
    /// it in epoch milliseconds.
    pub fn from_grant(grant: InitialGrant) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            access_token_expires_at: UnixMillis::from_secs(grant.expires_at),
            last_error: None,
        }
    }

    /// Gets the current access token
    ///
    /// Consumers must re-check expiry on every use; validity is never cached
    /// across requests.
    #[inline]
    pub fn access_token(&self) -> &AccessTokenRef {
        &self.access_token
    }

    /// Gets the current refresh token
    #[inline]
    pub(crate) fn refresh_token(&self) -> &RefreshTokenRef {
        &self.refresh_token
    }

    /// Gets the absolute time after which the access token must not be used
    #[inline]
    pub fn access_token_expires_at(&self) -> UnixMillis {
        self.access_token_expires_at
    }

    /// Gets the recorded outcome of the most recent refresh attempt
    #[inline]
    pub fn last_error(&self) -> Option<LastError> {
        self.last_error
    }

    /// Gets the record's lifecycle status based on the current time as
    /// reported by the provided clock
    #[inline]
    pub fn status_with_clock<C: Clock>(&self, clock: &C) -> TokenStatus {
        self.status_at(clock.now())
    }

    /// Gets the record's lifecycle status as of the provided time
    #[inline]
    pub fn status_at(&self, time: UnixMillis) -> TokenStatus {
        if time < self.access_token_expires_at {
            TokenStatus::Fresh
        } else {
            TokenStatus::Expired
        }
    }

    /// Applies the result of a successful refresh exchange
    ///
    /// The prior refresh token is retained unless the IDP rotated it; a
    /// recorded failure is cleared.
    pub(crate) fn apply_refresh(&mut self, fresh: RefreshedToken) {
        self.access_token = fresh.access_token;
        self.access_token_expires_at = fresh.access_token_expires_at;
        if let Some(rotated) = fresh.refresh_token {
            self.refresh_token = rotated;
        }
        self.last_error = None;
    }

    /// Records a failed refresh attempt, preserving the stale tokens
    pub(crate) fn mark_refresh_failed(&mut self) {
        self.last_error = Some(LastError::RefreshFailed);
    }
}
