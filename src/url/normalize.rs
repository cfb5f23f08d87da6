use crate::UrlError;
use url::Url;

/// Parses a seed URL supplied by the caller
///
/// Only absolute http(s) URLs with a host are accepted. The fragment is
/// dropped so the seed has the same shape as discovered links.
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::parse_seed;
///
/// let url = parse_seed(" https://example.com/blog#top ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/blog");
/// ```
pub fn parse_seed(seed: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Resolves an `href` found on `base` into a crawlable absolute URL
///
/// Returns None if the link should be ignored:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: links
/// - anything that is not http(s) after resolution
///
/// The fragment is removed so `page#a` and `page#b` are one URL.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::canonicalize_link;
///
/// let base = Url::parse("https://example.com/posts/one").unwrap();
/// let link = canonicalize_link("../about#team", &base).unwrap();
/// assert_eq!(link.as_str(), "https://example.com/about");
/// ```
pub fn canonicalize_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut absolute = base.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    absolute.set_fragment(None);
    Some(absolute)
}
