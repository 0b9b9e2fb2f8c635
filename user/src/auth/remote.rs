//! Identity asserted by the trusted reverse proxy.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Header carrying the user's email.
pub const REMOTE_USER_HEADER: &str = "x-remote-user";
/// Header carrying the user's full display name.
pub const REMOTE_NAME_HEADER: &str = "x-remote-name";
/// Header carrying a comma-separated list of group tokens.
pub const REMOTE_GROUP_HEADER: &str = "x-remote-group";

/// What the proxy says about the caller. All three headers are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIdentityAssertion {
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Group tokens in header order, trimmed, empties dropped
    pub groups: Vec<String>,
}

impl RemoteIdentityAssertion {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let email = header_value(headers, REMOTE_USER_HEADER);
        let display_name = header_value(headers, REMOTE_NAME_HEADER);
        let groups = header_value(headers, REMOTE_GROUP_HEADER)
            .map(|raw| split_groups(&raw))
            .unwrap_or_default();

        Self {
            email,
            display_name,
            groups,
        }
    }

    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the groups from a raw comma-separated header value.
    pub fn with_groups(mut self, raw: &str) -> Self {
        self.groups = split_groups(raw);
        self
    }

    /// The email with surrounding whitespace removed, if any is left.
    pub fn normalized_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn split_groups(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// A display name split into first and last name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName {
    pub first_name: String,
    pub last_name: String,
}

/// Splits a full name on whitespace.
///
/// The last token is the last name and everything before it, joined by single
/// spaces, is the first name. Names with fewer than two tokens yield `None`.
pub fn parse_display_name(raw: &str) -> Option<DisplayName> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let (last, rest) = tokens.split_last()?;
    if rest.is_empty() {
        return None;
    }

    Some(DisplayName {
        first_name: rest.join(" "),
        last_name: last.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Remote-User", HeaderValue::from_static("ada@example.com"));
        headers.insert("X-Remote-Name", HeaderValue::from_static("Ada Lovelace"));
        headers.insert(
            "X-Remote-Group",
            HeaderValue::from_static(" group-viewer , ,group-admin,"),
        );

        let assertion = RemoteIdentityAssertion::from_headers(&headers);
        assert_eq!(assertion.email.as_deref(), Some("ada@example.com"));
        assert_eq!(assertion.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(assertion.groups, vec!["group-viewer", "group-admin"]);
    }

    #[test]
    fn test_missing_headers() {
        let assertion = RemoteIdentityAssertion::from_headers(&HeaderMap::new());
        assert_eq!(assertion, RemoteIdentityAssertion::default());
        assert!(assertion.normalized_email().is_none());
    }

    #[test]
    fn test_normalized_email() {
        assert_eq!(
            RemoteIdentityAssertion::for_email("  ada@example.com ").normalized_email(),
            Some("ada@example.com")
        );
        assert_eq!(RemoteIdentityAssertion::for_email("   ").normalized_email(), None);
    }

    #[rstest]
    #[case("Ada Lovelace Byron", "Ada Lovelace", "Byron")]
    #[case("  Grace   Hopper ", "Grace", "Hopper")]
    #[case("Jean-Luc Picard", "Jean-Luc", "Picard")]
    fn test_parse_display_name(#[case] raw: &str, #[case] first: &str, #[case] last: &str) {
        assert_eq!(
            parse_display_name(raw),
            Some(DisplayName {
                first_name: first.to_string(),
                last_name: last.to_string(),
            })
        );
    }

    #[rstest]
    #[case("Ada")]
    #[case("   ")]
    #[case("")]
    fn test_parse_display_name_needs_two_tokens(#[case] raw: &str) {
        assert_eq!(parse_display_name(raw), None);
    }
}
