//! Utility functions and helpers

/// Join a dotted document path with a child key
pub fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Check that a URL carries an http(s) scheme and a host
pub fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

/// Mask a secret, keeping only the last four characters visible
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let visible: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "providers"), "providers");
        assert_eq!(join_path("providers", "openai"), "providers.openai");
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("http://localhost:6333"));
        assert!(is_http_url("https://qdrant.example.com"));
        assert!(!is_http_url("localhost:6333"));
        assert!(!is_http_url("http://"));
        assert!(!is_http_url("${VECTOR_DB_URL}"));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-test1234"), "*******1234");
        assert_eq!(mask_secret("abc"), "***");
    }
}
