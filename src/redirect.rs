//! Post-sign-in redirect policy
//!
//! A pure mapping from a requested redirect target and the deployment's base
//! URL to the final target. Cross-origin targets are silently corrected to
//! the base URL; this is the open-redirect guard, not an error path.

use url::Url;

/// Resolves a post-sign-in redirect target against the deployment base URL
///
/// Applied in order:
/// 1. a target under `{base}/signin` lands on `{base}/contacts`;
/// 2. a relative path is joined onto the base;
/// 3. a same-origin absolute URL passes through unchanged;
/// 4. anything else collapses to the base URL.
pub fn resolve(url: &str, base_url: &Url) -> String {
    let base = base_url.as_str().trim_end_matches('/');

    if url.starts_with(&format!("{base}/signin")) {
        return format!("{base}/contacts");
    }

    if url.starts_with('/') {
        return format!("{base}{url}");
    }

    if let Ok(target) = Url::parse(url) {
        if target.origin() == base_url.origin() {
            return url.to_owned();
        }
    }

    tracing::debug!(rejected = url, "cross-origin redirect target corrected to base URL");
    base.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://app.example").unwrap()
    }

    #[test]
    fn signin_target_lands_on_contacts() {
        assert_eq!(
            resolve("https://app.example/signin", &base()),
            "https://app.example/contacts"
        );
        assert_eq!(
            resolve("https://app.example/signin?callbackUrl=%2F", &base()),
            "https://app.example/contacts"
        );
    }

    #[test]
    fn relative_path_is_joined_onto_base() {
        assert_eq!(
            resolve("/contacts/7/edit", &base()),
            "https://app.example/contacts/7/edit"
        );
    }

    #[test]
    fn same_origin_absolute_url_passes_through() {
        assert_eq!(
            resolve("https://app.example/contacts?page=2", &base()),
            "https://app.example/contacts?page=2"
        );
    }

    #[test]
    fn cross_origin_target_collapses_to_base() {
        assert_eq!(
            resolve("https://evil.example/x", &base()),
            "https://app.example"
        );
    }

    #[test]
    fn garbage_target_collapses_to_base() {
        assert_eq!(resolve("not a url", &base()), "https://app.example");
        assert_eq!(resolve("", &base()), "https://app.example");
    }

    #[test]
    fn resolution_is_idempotent() {
        let base = base();
        for target in [
            "https://app.example/signin",
            "/contacts",
            "https://app.example/contacts?page=2",
            "https://evil.example/x",
            "not a url",
        ] {
            let once = resolve(target, &base);
            assert_eq!(resolve(&once, &base), once);
        }
    }
}
