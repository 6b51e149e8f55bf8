//! The consuming interface of the contacts CRUD API
//!
//! Every call attaches the current request's access token as a bearer
//! credential. Listing failures are swallowed into an empty result; a page
//! degrades to an empty table rather than crashing when the API or the
//! session is unavailable. A `401`/`403` from the API receives no special
//! handling here; this crate only guarantees the token was unexpired when
//! the session was produced.

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// A contact record as served by the contacts API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// The unique identifier for the contact
    pub id: i32,
    /// The first name of the contact
    pub first_name: String,
    /// The last name of the contact
    pub last_name: String,
    /// The email address of the contact
    pub email: String,
    /// The phone number of the contact
    pub phone_number: String,
}

/// A client for the contacts API
#[derive(Clone, Debug)]
pub struct ContactsClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl ContactsClient {
    /// Constructs a client for the contacts API rooted at `base_url`
    pub fn new(http: reqwest::Client, base_url: reqwest::Url) -> Self {
        Self { http, base_url }
    }

    /// Lists all contacts, authorized by the session's access token
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] on network failure, a
    /// non-success status, or an unreadable body.
    pub async fn list(&self, session: &Session) -> Result<Vec<Contact>, reqwest::Error> {
        self.http
            .get(self.endpoint())
            .bearer_auth(session.access_token.as_str())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Lists all contacts, degrading every failure to an empty list
    ///
    /// With no session present the authorized call is skipped entirely.
    pub async fn list_or_empty(&self, session: Option<&Session>) -> Vec<Contact> {
        let Some(session) = session else {
            tracing::debug!("no session, skipping authorized contacts fetch");
            return Vec::new();
        };

        match self.list(session).await {
            Ok(contacts) => contacts,
            Err(error) => {
                tracing::warn!(
                    error = (&error as &dyn std::error::Error),
                    "contacts fetch failed, serving empty list"
                );
                Vec::new()
            }
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/contacts", self.base_url.as_str().trim_end_matches('/'))
    }
}
