use crate::clock::{Clock, System};
use crate::record::{TokenRecord, TokenStatus};
use crate::refresh::dto::InitialGrant;
use crate::refresh::RefreshTokenExchange;
use crate::session::{Session, SessionState, UserClaims};

/// The per-request orchestrator of the token lifecycle
///
/// On every incoming request the gate inspects the session state found in the
/// host's session storage, decides between reuse, refresh, and failure, and
/// produces the [`Session`] for that request. It is the only component that
/// mutates a [`TokenRecord`].
///
/// The gate holds no per-session state of its own; the state is threaded
/// through [`resolve`][SessionGate::resolve] explicitly, so one gate serves
/// every request.
#[derive(Clone, Debug)]
pub struct SessionGate<X, C = System> {
    exchange: X,
    clock: C,
}

impl<X> SessionGate<X> {
    /// Constructs a gate around a refresh exchange, using the system clock
    pub fn new(exchange: X) -> Self {
        Self {
            exchange,
            clock: System,
        }
    }
}

impl<X, C> SessionGate<X, C> {
    /// Sets a custom clock to be used
    ///
    /// Useful for testing purposes
    pub fn with_clock<D>(self, clock: D) -> SessionGate<X, D> {
        SessionGate {
            exchange: self.exchange,
            clock,
        }
    }

    /// Populates session state from the IDP's initial token grant
    ///
    /// Triggered once, when the authorization callback delivers the grant.
    /// Any prior state for the session is overwritten unconditionally.
    pub fn sign_in(&self, grant: InitialGrant, user: UserClaims) -> SessionState {
        SessionState {
            user,
            tokens: TokenRecord::from_grant(grant),
        }
    }
}

impl<X: RefreshTokenExchange, C: Clock> SessionGate<X, C> {
    /// Resolves the session for the current request
    ///
    /// With no stored state the request proceeds unauthenticated (`None`).
    /// A fresh record is reused without any network call. An expired record
    /// holds the request while exactly one refresh exchange runs; on success
    /// the record is updated in place, on failure the stale tokens are
    /// preserved and the produced session carries
    /// [`SessionError::RefreshAccessToken`][crate::SessionError]. A recorded
    /// failure is not sticky; the next request retries the refresh.
    pub async fn resolve(&self, state: Option<&mut SessionState>) -> Option<Session> {
        let state = state?;

        if let TokenStatus::Expired = state.tokens.status_with_clock(&self.clock) {
            tracing::debug!("access token expired, holding request for refresh");
            match self.exchange.refresh(state.tokens.refresh_token()).await {
                Ok(fresh) => {
                    tracing::debug!(
                        expires_at = fresh.access_token_expires_at.0,
                        "token refresh succeeded"
                    );
                    state.tokens.apply_refresh(fresh);
                }
                Err(error) => {
                    tracing::warn!(
                        error = (&error as &dyn std::error::Error),
                        "token refresh failed, keeping stale tokens for retry on next request"
                    );
                    state.tokens.mark_refresh_failed();
                }
            }
        }

        Some(Session::project(state))
    }
}
