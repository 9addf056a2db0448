//! Pure helper functions for the gate
//!
//! Cookie extraction, session cookie construction and query-string
//! rewriting. Everything here is side-effect free.

use axum::http::HeaderMap;

use crate::session::SESSION_COOKIE_NAME;

// =============================================================================
// Cookie Handling
// =============================================================================

/// Extract a cookie value from headers
///
/// Handles multiple Cookie headers (some proxies fold/duplicate headers).
/// Uses `get_all` to collect all Cookie header values.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);

    for header_value in headers.get_all("cookie") {
        if let Ok(cookie_str) = header_value.to_str() {
            if let Some(value) = cookie_str
                .split(';')
                .map(|c| c.trim())
                .find(|c| c.starts_with(&prefix))
                .and_then(|c| c.strip_prefix(&prefix))
            {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Build the `Set-Cookie` value for a newly created session
pub fn build_session_cookie(session_id: &str, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax{}",
        SESSION_COOKIE_NAME,
        session_id,
        if secure { "; Secure" } else { "" }
    )
}

// =============================================================================
// Query Rewriting
// =============================================================================

/// Remove the named parameters from a raw query string.
///
/// Remaining pairs keep their original order and encoding. Returns `None`
/// when nothing is left.
pub fn strip_query_parameters(query: &str, names: &[&str]) -> Option<String> {
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let name = pair.split_once('=').map(|(n, _)| n).unwrap_or(*pair);
            !names.contains(&name)
        })
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join("&"))
    }
}

/// Append `name=value` to a URL, choosing `?` or `&` as appropriate
pub fn append_query_parameter(url: &str, name: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}",
        url,
        separator,
        urlencoding::encode(name),
        urlencoding::encode(value)
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_cookie_finds_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("foo=bar; CASGATESESSIONID=abc123; baz=qux"),
        );

        let result = extract_cookie(&headers, SESSION_COOKIE_NAME);
        assert_eq!(result, Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_cookie_missing_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("foo=bar; baz=qux"));

        assert_eq!(extract_cookie(&headers, SESSION_COOKIE_NAME), None);
    }

    #[test]
    fn test_extract_cookie_no_cookie_header() {
        let headers = HeaderMap::new();
        assert_eq!(extract_cookie(&headers, SESSION_COOKIE_NAME), None);
    }

    #[test]
    fn test_extract_cookie_multiple_headers() {
        // Some proxies send multiple Cookie headers instead of one combined header
        let mut headers = HeaderMap::new();
        headers.append("cookie", HeaderValue::from_static("foo=bar"));
        headers.append(
            "cookie",
            HeaderValue::from_static("CASGATESESSIONID=second; baz=qux"),
        );

        assert_eq!(
            extract_cookie(&headers, SESSION_COOKIE_NAME),
            Some("second".to_string())
        );
    }

    #[test]
    fn test_build_session_cookie() {
        assert_eq!(
            build_session_cookie("xyz", false),
            "CASGATESESSIONID=xyz; HttpOnly; Path=/; SameSite=Lax"
        );
        assert!(build_session_cookie("xyz", true).ends_with("; Secure"));
    }

    #[test]
    fn test_strip_query_parameters() {
        assert_eq!(
            strip_query_parameters("a=1&ticket=ST-1&b=2", &["ticket"]),
            Some("a=1&b=2".to_string())
        );
        assert_eq!(
            strip_query_parameters("ticket=ST-1&service=x", &["ticket", "service"]),
            None
        );
        assert_eq!(
            strip_query_parameters("flag&ticket", &["ticket"]),
            Some("flag".to_string())
        );
    }

    #[test]
    fn test_strip_keeps_similar_names() {
        assert_eq!(
            strip_query_parameters("tickets=3&ticket=ST-1", &["ticket"]),
            Some("tickets=3".to_string())
        );
    }

    #[test]
    fn test_append_query_parameter() {
        assert_eq!(
            append_query_parameter("http://app/home", "gw", "true"),
            "http://app/home?gw=true"
        );
        assert_eq!(
            append_query_parameter("http://app/home?a=1", "gw", "true"),
            "http://app/home?a=1&gw=true"
        );
    }
}
