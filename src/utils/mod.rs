//! Utility functions and helpers.

pub mod encoding;
pub mod http;
pub mod text;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/product/123").unwrap();
        assert_eq!(
            resolve_url(&base, "/img/1.jpg"),
            "https://example.com/img/1.jpg"
        );
        assert_eq!(
            resolve_url(&base, "thumb.jpg"),
            "https://example.com/product/thumb.jpg"
        );
        assert_eq!(
            resolve_url(&base, "//cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x.jpg"),
            "https://other.com/x.jpg"
        );
    }
}
