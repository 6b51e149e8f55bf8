//! DTOs for interacting with the IDP's token endpoint

use serde::{Deserialize, Serialize, Serializer};

use crate::braids::{
    AccessToken, AccessTokenRef, ClientIdRef, ClientSecretRef, RefreshToken, RefreshTokenRef,
};

/// The initial grant delivered by the IDP's authorization-code callback
///
/// This is the only payload that may populate a brand new token record; it
/// seeds the record's expiry from `expires_at * 1000`.
#[derive(Debug, Deserialize)]
pub struct InitialGrant {
    /// The first access token of the session
    pub access_token: AccessToken,
    /// The refresh token for the session
    pub refresh_token: RefreshToken,
    /// Absolute access token expiry, in epoch seconds
    pub expires_at: u64,
}

/// The form body sent for a `refresh_token` grant
#[derive(Debug)]
pub(crate) struct RefreshTokenGrant<'a> {
    pub client_id: &'a ClientIdRef,
    pub client_secret: Option<&'a ClientSecretRef>,
    pub refresh_token: &'a RefreshTokenRef,
}

impl Serialize for RefreshTokenGrant<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut ser = serializer.serialize_struct("RefreshTokenGrant", 4)?;
        ser.serialize_field("grant_type", "refresh_token")?;
        ser.serialize_field("client_id", self.client_id)?;
        if let Some(secret) = self.client_secret {
            ser.serialize_field("client_secret", secret)?;
        } else {
            ser.skip_field("client_secret")?;
        }
        ser.serialize_field("refresh_token", self.refresh_token)?;
        ser.end()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse<'a> {
    #[serde(borrow)]
    pub access_token: &'a AccessTokenRef,
    #[serde(borrow, default)]
    pub refresh_token: Option<&'a RefreshTokenRef>,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::braids::{ClientId, ClientSecret};

    #[test]
    fn public_client_omits_client_secret() {
        let client_id = ClientId::from_static("contacts-web");
        let refresh_token = RefreshToken::from_static("R1");
        let grant = RefreshTokenGrant {
            client_id: &client_id,
            client_secret: None,
            refresh_token: &refresh_token,
        };

        let encoded = serde_urlencoded::to_string(&grant).unwrap();
        assert_eq!(
            encoded,
            "grant_type=refresh_token&client_id=contacts-web&refresh_token=R1"
        );
    }

    #[test]
    fn confidential_client_sends_client_secret() {
        let client_id = ClientId::from_static("contacts-web");
        let client_secret = ClientSecret::from_static("s3cret");
        let refresh_token = RefreshToken::from_static("R1");
        let grant = RefreshTokenGrant {
            client_id: &client_id,
            client_secret: Some(&client_secret),
            refresh_token: &refresh_token,
        };

        let encoded = serde_urlencoded::to_string(&grant).unwrap();
        assert_eq!(
            encoded,
            "grant_type=refresh_token&client_id=contacts-web&client_secret=s3cret&refresh_token=R1"
        );
    }

    #[test]
    fn token_response_tolerates_missing_refresh_token() {
        let body = br#"{"access_token":"A2","expires_in":300}"#;
        let resp: TokenResponse = serde_json::from_slice(body).unwrap();

        assert_eq!(resp.access_token.as_str(), "A2");
        assert_eq!(resp.expires_in, 300);
        assert!(resp.refresh_token.is_none());
    }

    #[test]
    fn token_response_reads_rotated_refresh_token() {
        let body = br#"{"access_token":"A2","refresh_token":"R2","expires_in":300}"#;
        let resp: TokenResponse = serde_json::from_slice(body).unwrap();

        assert_eq!(resp.refresh_token.unwrap().as_str(), "R2");
    }

    #[test]
    fn malformed_body_is_rejected() {
        let body = br#"{"expires_in":300}"#;
        assert!(serde_json::from_slice::<TokenResponse>(body).is_err());
    }
}
