//! Call-to-action link targeting.
//!
//! A card link opens in a new tab when the item asks for it. Under
//! `LinkPolicy::CrossHost` it also opens in a new tab when the link, resolved
//! against the host page URL, points at a different hostname. Links that
//! cannot be resolved stay in place.

use serde::Serialize;
use url::Url;

/// Attributes appended to anchors that open in a new tab.
pub const NEW_TAB_ATTRS: &str = r#" target="_blank" rel="noopener noreferrer""#;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPolicy {
    /// Only the per-item `newTab` flag opens a new tab.
    ExplicitOnly,
    /// `newTab`, or any link whose hostname differs from the page's.
    #[default]
    CrossHost,
}

/// Decide whether a card link should open in a new tab.
pub fn opens_new_tab(
    policy: LinkPolicy,
    explicit: bool,
    href: &str,
    page_url: Option<&Url>,
) -> bool {
    if explicit {
        return true;
    }
    match policy {
        LinkPolicy::ExplicitOnly => false,
        LinkPolicy::CrossHost => is_cross_host(href, page_url),
    }
}

/// True when `href` resolves to a hostname other than the page's.
///
/// Relative links need a page URL to resolve; without one they are treated
/// as same-page. Schemes without a host (`mailto:`) compare as an empty host.
pub fn is_cross_host(href: &str, page_url: Option<&Url>) -> bool {
    let resolved = match page_url {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };
    let Ok(resolved) = resolved else {
        return false;
    };
    let page_host = page_url.and_then(Url::host_str).unwrap_or("");
    resolved.host_str().unwrap_or("") != page_host
}
