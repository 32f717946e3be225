//! AMP cache variants

use serde::Serialize;

/// One of the independently cached representations of a page.
///
/// See <https://amp.dev/documentation/guides-and-tutorials/learn/amp-caches-and-cors/amp-cache-urls/>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheVariant {
    /// Raw AMP document (`/c/`)
    Content,
    /// Signed exchange (`/wp/`)
    WebPackage,
    /// Viewer render (`/v/`)
    Viewer,
}

impl CacheVariant {
    pub const ALL: [CacheVariant; 3] = [
        CacheVariant::Content,
        CacheVariant::WebPackage,
        CacheVariant::Viewer,
    ];

    /// Path prefix used by the cache for this variant
    pub fn prefix(&self) -> &'static str {
        match self {
            CacheVariant::Content => "c",
            CacheVariant::WebPackage => "wp",
            CacheVariant::Viewer => "v",
        }
    }

    /// Whether the entry must be probed before it may be purged
    pub fn requires_probe(&self) -> bool {
        matches!(self, CacheVariant::Viewer)
    }

    /// Query parameter the cache insists on for reads of this variant.
    ///
    /// The viewer cache answers 404 for every request without `amp_js_v`.
    pub fn probe_query(&self) -> Option<&'static str> {
        match self {
            CacheVariant::Viewer => Some("amp_js_v=0.1"),
            _ => None,
        }
    }
}

impl std::fmt::Display for CacheVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheVariant::Content => write!(f, "content"),
            CacheVariant::WebPackage => write!(f, "web_package"),
            CacheVariant::Viewer => write!(f, "viewer"),
        }
    }
}
