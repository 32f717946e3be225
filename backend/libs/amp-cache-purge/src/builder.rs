//! AMP cache URL construction
//!
//! Update-cache request format:
//! `https://{origin}/update-cache/{prefix}/s/{host}{request_uri}?amp_action=flush&amp_ts={ts}&amp_url_signature={sig}`
//!
//! The signature covers the path and query only, starting at the leading `/`.

use rsa::RsaPrivateKey;
use url::Url;

use crate::error::{PurgeError, SigningError};
use crate::signer::sign_path;
use crate::variant::CacheVariant;

pub const AMP_CDN_DOMAIN: &str = "cdn.ampproject.org";

/// Host and request-URI of the page being purged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    host: String,
    request_uri: String,
}

impl TargetUrl {
    /// Parse an absolute URL.
    ///
    /// The host keeps an explicit port; the request-URI is the escaped path plus
    /// `?query`, without the fragment.
    pub fn parse(raw: &str) -> Result<Self, PurgeError> {
        let parsed = Url::parse(raw).map_err(|_| PurgeError::InvalidUrl(raw.to_string()))?;

        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(PurgeError::InvalidUrl(raw.to_string())),
        };
        if host.is_empty() {
            return Err(PurgeError::InvalidUrl(raw.to_string()));
        }

        let path = if parsed.path().is_empty() {
            "/"
        } else {
            parsed.path()
        };
        let request_uri = match parsed.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        };

        Ok(Self { host, request_uri })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }
}

/// AMP cache origin for a publisher host: every `.` becomes `-`
pub fn build_origin(host: &str) -> String {
    format!("https://{}.{}", host.replace('.', "-"), AMP_CDN_DOMAIN)
}

/// Path and query that gets signed for an update-cache request
pub fn build_purge_path(
    variant: CacheVariant,
    host: &str,
    request_uri: &str,
    timestamp: i64,
) -> String {
    format!(
        "/update-cache/{}/s/{}{}?amp_action=flush&amp_ts={}",
        variant.prefix(),
        host,
        request_uri,
        timestamp
    )
}

/// Unauthenticated read path used to check whether a variant is cached
pub fn build_probe_path(variant: CacheVariant, host: &str, request_uri: &str) -> String {
    let path = format!("/{}/s/{}{}", variant.prefix(), host, request_uri);
    match variant.probe_query() {
        Some(query) => {
            let separator = if request_uri.contains('?') { '&' } else { '?' };
            format!("{path}{separator}{query}")
        }
        None => path,
    }
}

/// Full signed update-cache URL
pub fn build_purge_url(
    variant: CacheVariant,
    host: &str,
    request_uri: &str,
    timestamp: i64,
    key: &RsaPrivateKey,
) -> Result<String, SigningError> {
    let path = build_purge_path(variant, host, request_uri, timestamp);
    let signature = sign_path(&path, key)?;
    Ok(format!(
        "{}{}&amp_url_signature={}",
        build_origin(host),
        path,
        signature
    ))
}

/// A signed purge request for one variant, read-only once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeRequest {
    pub variant: CacheVariant,
    pub origin: String,
    pub path: String,
    pub timestamp: i64,
    pub signature: String,
}

impl PurgeRequest {
    pub fn new(
        variant: CacheVariant,
        target: &TargetUrl,
        timestamp: i64,
        key: &RsaPrivateKey,
    ) -> Result<Self, SigningError> {
        let path = build_purge_path(variant, target.host(), target.request_uri(), timestamp);
        let signature = sign_path(&path, key)?;

        Ok(Self {
            variant,
            origin: build_origin(target.host()),
            path,
            timestamp,
            signature,
        })
    }

    pub fn url(&self) -> String {
        format!(
            "{}{}&amp_url_signature={}",
            self.origin, self.path, self.signature
        )
    }
}
