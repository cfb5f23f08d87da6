use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs point at the same host
///
/// This is the crawl scope: only links for which this holds against the page
/// they were found on are followed. The scheme is ignored, so `http` and
/// `https` links to one host stay in scope; an explicit non-default port
/// must match.
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::is_same_host;
///
/// let page = Url::parse("https://example.com/a").unwrap();
/// assert!(is_same_host(&page, &Url::parse("https://Example.com/b").unwrap()));
/// assert!(is_same_host(&page, &Url::parse("http://example.com/c").unwrap()));
/// assert!(!is_same_host(&page, &Url::parse("https://blog.example.com/").unwrap()));
/// ```
pub fn is_same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(host_a), Some(host_b)) => {
            host_a == host_b && a.port() == b.port()
        }
        _ => false,
    }
}
