use std::fmt;

use aliri_braid::braid;

/// Replaces the derived `Debug`/`Display` of a secret braid with a redacted
/// placeholder; the alternate form (`{:#}`/`{:#?}`) reveals a short prefix,
/// with the width specifier overriding how much.
macro_rules! redact {
    ($ty:ty: $label:literal, $reveal:literal) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if f.alternate() {
                    f.write_str("\"")?;
                    reveal_prefix(&self.0, &mut *f, $reveal)?;
                    f.write_str("\"")
                } else {
                    f.write_str(concat!("***", $label, "***"))
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if f.alternate() {
                    reveal_prefix(&self.0, &mut *f, usize::MAX)
                } else {
                    f.write_str(concat!("***", $label, "***"))
                }
            }
        }
    };
}

fn reveal_prefix(secret: &str, f: &mut fmt::Formatter, default_len: usize) -> fmt::Result {
    let max_len = f.width().unwrap_or(default_len);
    if max_len <= 1 {
        return f.write_str("…");
    }
    if max_len > secret.len() {
        return f.write_str(secret);
    }

    // keep max_len - 1 characters and elide the remainder
    let keep = secret
        .char_indices()
        .nth(max_len - 2)
        .map(|(idx, c)| idx + c.len_utf8())
        .unwrap_or(secret.len());
    if keep < secret.len() {
        f.write_str(&secret[..keep])?;
        f.write_str("…")
    } else {
        f.write_str(secret)
    }
}

/// The OAuth2 client ID registered with the IDP
#[braid(serde)]
pub struct ClientId;

/// The OAuth2 client secret, present only for confidential IDP clients
#[braid(serde, debug = "owned", display = "owned")]
pub struct ClientSecret;

redact!(ClientSecretRef: "CLIENT SECRET", 5);

/// A bearer access token authorizing calls to the contacts API
#[braid(serde, debug = "owned", display = "owned")]
pub struct AccessToken;

redact!(AccessTokenRef: "ACCESS TOKEN", 15);

/// A refresh token used to obtain a new access token without re-authenticating
#[braid(serde, debug = "owned", display = "owned")]
pub struct RefreshToken;

redact!(RefreshTokenRef: "REFRESH TOKEN", 5);

/// The secret used by the host to sign and encrypt its session storage
#[braid(serde, debug = "owned", display = "owned")]
pub struct SessionSecret;

redact!(SessionSecretRef: "SESSION SECRET", 5);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::from_static("a-very-secret-bearer-token");
        assert_eq!(format!("{:?}", token), "***ACCESS TOKEN***");
        assert_eq!(format!("{}", token), "***ACCESS TOKEN***");
    }

    #[test]
    fn alternate_debug_reveals_limited_prefix() {
        let token = RefreshToken::from_static("refresh-token-value");
        let shown = format!("{:#?}", token);
        assert!(shown.len() < "refresh-token-value".len());
        assert!(shown.starts_with("\"ref"));
    }

    #[test]
    fn client_id_is_not_redacted() {
        let id = ClientId::from_static("contacts-web");
        assert_eq!(format!("{}", id), "contacts-web");
    }
}
