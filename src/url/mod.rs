//! URL handling module for Craft-Harvest
//!
//! Catalog pages use a mix of absolute and site-relative links. Everything
//! the crawler keeps (category links, detail pages, image sources) goes
//! through [`resolve_href`] so it is stored as an absolute HTTP(S) URL.

use url::Url;

/// Resolves an `href`/`src` attribute value against the page it was found on
///
/// Returns None if the link should be ignored:
/// - empty or fragment-only values
/// - `javascript:`, `mailto:`, `tel:` and `data:` schemes
/// - values that do not resolve to an HTTP(S) URL
///
/// The fragment of the resolved URL is dropped.
///
/// # Examples
///
/// ```
/// use craft_harvest::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://www.grabcraft.com/minecraft/houses").unwrap();
/// let url = resolve_href(&base, "/minecraft/small-house#comments").unwrap();
/// assert_eq!(url.as_str(), "https://www.grabcraft.com/minecraft/small-house");
/// ```
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
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

    let mut resolved = base.join(href).ok()?;
    if !is_http(&resolved) {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved)
}

/// Returns true if the URL uses the HTTP or HTTPS scheme
pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
