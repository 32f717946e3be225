//! Purge orchestration
//!
//! One `purge_url` call fans out into three independent units and joins on all of them:
//!
//! ```text
//!            ┌── purge c ───────────────────────┐
//! parse/sign ├── purge wp ──────────────────────┼── join ── PurgeReport
//!            └── probe v ── (200) ── purge v ───┘
//! ```
//!
//! A failed unit never cancels its siblings. Each transport call has its own deadline.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::builder::{build_origin, build_probe_path, PurgeRequest, TargetUrl};
use crate::config::PurgeConfig;
use crate::credentials::CredentialProvider;
use crate::error::{PurgeError, PurgeFailure, TransportError};
use crate::transport::{HttpTransport, ReqwestTransport, TransportResponse};
use crate::variant::CacheVariant;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PURGE_OK_BODY: &str = "OK";

/// Result of one variant within a purge operation
#[derive(Debug)]
pub enum VariantOutcome {
    /// Cache acknowledged the purge
    Purged,
    /// Probe found nothing cached, so no purge was sent
    Skipped,
    Failed(PurgeFailure),
}

impl VariantOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, VariantOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct VariantResult {
    pub variant: CacheVariant,
    pub outcome: VariantOutcome,
}

/// Per-variant outcome of one purge operation
#[derive(Debug)]
pub struct PurgeReport {
    pub url: String,
    pub timestamp: i64,
    pub results: Vec<VariantResult>,
}

impl PurgeReport {
    /// True when no attempted purge failed
    pub fn is_success(&self) -> bool {
        !self.results.iter().any(|r| r.outcome.is_failure())
    }

    pub fn outcome(&self, variant: CacheVariant) -> Option<&VariantOutcome> {
        self.results
            .iter()
            .find(|r| r.variant == variant)
            .map(|r| &r.outcome)
    }

    pub fn failed_variants(&self) -> Vec<CacheVariant> {
        self.results
            .iter()
            .filter(|r| r.outcome.is_failure())
            .map(|r| r.variant)
            .collect()
    }

    pub fn purged_variants(&self) -> Vec<CacheVariant> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, VariantOutcome::Purged))
            .map(|r| r.variant)
            .collect()
    }

    pub(crate) fn describe_failures(&self) -> String {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                VariantOutcome::Failed(failure) => Some(format!("{}: {}", r.variant, failure)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Purges every cached variant of a page from the AMP cache
pub struct CachePurger {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialProvider>,
    request_timeout: Duration,
}

impl CachePurger {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            transport,
            credentials,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Deadline applied to every probe and purge call
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build a purger with a `reqwest` transport and the configured key provider
    pub fn from_config(config: &PurgeConfig) -> Result<Self, PurgeError> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::new(Arc::new(transport), config.credentials())
            .with_request_timeout(config.request_timeout()))
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    /// Purge all cache variants of `raw_url`.
    ///
    /// Returns the per-variant report on success, `PurgeError::Purge` carrying the same
    /// report when any attempted purge failed.
    pub async fn purge_url(&self, raw_url: &str) -> Result<PurgeReport, PurgeError> {
        self.purge_url_at(raw_url, Utc::now().timestamp()).await
    }

    /// Same as [`purge_url`](Self::purge_url) with a caller-supplied unix timestamp
    pub async fn purge_url_at(
        &self,
        raw_url: &str,
        timestamp: i64,
    ) -> Result<PurgeReport, PurgeError> {
        let target = TargetUrl::parse(raw_url)?;
        let key = self.credentials.current_key()?;

        let content = PurgeRequest::new(CacheVariant::Content, &target, timestamp, &key)?;
        let web_package = PurgeRequest::new(CacheVariant::WebPackage, &target, timestamp, &key)?;
        let viewer = PurgeRequest::new(CacheVariant::Viewer, &target, timestamp, &key)?;
        let viewer_probe = format!(
            "{}{}",
            build_origin(target.host()),
            build_probe_path(CacheVariant::Viewer, target.host(), target.request_uri())
        );

        let (viewer_outcome, content_outcome, web_package_outcome) = tokio::join!(
            self.purge_if_cached(&viewer_probe, &viewer),
            self.purge_variant(&content),
            self.purge_variant(&web_package),
        );

        let report = PurgeReport {
            url: raw_url.to_string(),
            timestamp,
            results: vec![
                VariantResult {
                    variant: CacheVariant::Content,
                    outcome: content_outcome,
                },
                VariantResult {
                    variant: CacheVariant::WebPackage,
                    outcome: web_package_outcome,
                },
                VariantResult {
                    variant: CacheVariant::Viewer,
                    outcome: viewer_outcome,
                },
            ],
        };

        if report.is_success() {
            info!(url = %raw_url, purged = ?report.purged_variants(), "AMP cache purge completed");
            Ok(report)
        } else {
            warn!(url = %raw_url, failed = ?report.failed_variants(), "AMP cache purge failed");
            Err(PurgeError::Purge(report))
        }
    }

    /// Existence probe: only an exact 200 counts as cached
    pub async fn cache_exists(&self, probe_url: &str) -> bool {
        match self.get(probe_url).await {
            Ok(response) => {
                debug!(url = %probe_url, status = response.status, "Cache probe");
                response.status == 200
            }
            Err(e) => {
                warn!(url = %probe_url, error = %e, "Cache probe failed");
                false
            }
        }
    }

    /// Send one signed purge; succeeds only on 200 with body `OK`
    pub async fn purge_request(&self, purge_url: &str) -> Result<(), PurgeFailure> {
        info!(url = %purge_url, "Purging");

        let TransportResponse { status, body } = self.get(purge_url).await?;
        if status != 200 {
            return Err(PurgeFailure::Status(status));
        }
        if body != PURGE_OK_BODY {
            return Err(PurgeFailure::UnexpectedBody(body));
        }
        Ok(())
    }

    async fn purge_if_cached(&self, probe_url: &str, request: &PurgeRequest) -> VariantOutcome {
        if !self.cache_exists(probe_url).await {
            debug!(variant = %request.variant, "Variant not cached, skipping purge");
            return VariantOutcome::Skipped;
        }
        self.purge_variant(request).await
    }

    async fn purge_variant(&self, request: &PurgeRequest) -> VariantOutcome {
        match self.purge_request(&request.url()).await {
            Ok(()) => VariantOutcome::Purged,
            Err(failure) => {
                warn!(variant = %request.variant, error = %failure, "Variant purge failed");
                VariantOutcome::Failed(failure)
            }
        }
    }

    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        match tokio::time::timeout(self.request_timeout, self.transport.get(url)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                url: url.to_string(),
                timeout: self.request_timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<(CacheVariant, VariantOutcome)>) -> PurgeReport {
        PurgeReport {
            url: "https://www.example.com/amp/page".to_string(),
            timestamp: 1637421562,
            results: outcomes
                .into_iter()
                .map(|(variant, outcome)| VariantResult { variant, outcome })
                .collect(),
        }
    }

    #[test]
    fn test_report_success_with_skipped_viewer() {
        let report = report(vec![
            (CacheVariant::Content, VariantOutcome::Purged),
            (CacheVariant::WebPackage, VariantOutcome::Purged),
            (CacheVariant::Viewer, VariantOutcome::Skipped),
        ]);
        assert!(report.is_success());
        assert_eq!(
            report.purged_variants(),
            vec![CacheVariant::Content, CacheVariant::WebPackage]
        );
        assert!(report.failed_variants().is_empty());
    }

    #[test]
    fn test_report_failure_lists_variants() {
        let report = report(vec![
            (CacheVariant::Content, VariantOutcome::Purged),
            (
                CacheVariant::WebPackage,
                VariantOutcome::Failed(PurgeFailure::Status(403)),
            ),
            (CacheVariant::Viewer, VariantOutcome::Purged),
        ]);
        assert!(!report.is_success());
        assert_eq!(report.failed_variants(), vec![CacheVariant::WebPackage]);
        assert_eq!(report.describe_failures(), "web_package: unexpected status 403");

        let err = PurgeError::Purge(report);
        assert_eq!(
            err.to_string(),
            "Failed to purge https://www.example.com/amp/page: web_package: unexpected status 403"
        );
    }
}
