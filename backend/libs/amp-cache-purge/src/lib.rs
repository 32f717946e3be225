//! AMP cache purge library
//!
//! Invalidates a page in the AMP cache (`*.cdn.ampproject.org`) across all of its
//! cache variants with signed `update-cache` requests.
//!
//! # Flow
//!
//! ```text
//! CachePurger::purge_url("https://www.example.com/amp/page")
//!   1. parse url, capture one unix timestamp
//!   2. fetch signing key from the CredentialProvider
//!   3. build signed purge URLs for c / wp / v
//!   4. concurrently:
//!        - purge /update-cache/c/...
//!        - purge /update-cache/wp/...
//!        - probe /v/s/...?amp_js_v=0.1, purge /update-cache/v/... when cached
//!   5. reduce per-variant outcomes into a PurgeReport
//! ```
//!
//! # Example
//!
//! ```no_run
//! use amp_cache_purge::{CachePurger, PurgeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PurgeConfig::from_env()?;
//!     let purger = CachePurger::from_config(&config)?;
//!
//!     let report = purger.purge_url("https://www.example.com/amp/page").await?;
//!     println!("purged {} variants", report.purged_variants().len());
//!     Ok(())
//! }
//! ```

mod builder;
mod config;
mod credentials;
mod error;
mod legacy_pem;
mod purger;
mod signer;
mod transport;
mod variant;

pub use builder::{
    build_origin, build_probe_path, build_purge_path, build_purge_url, PurgeRequest, TargetUrl,
    AMP_CDN_DOMAIN,
};
pub use config::PurgeConfig;
pub use credentials::{
    load_private_key, parse_private_key_pem, CachedKeyProvider, CredentialProvider,
    FileKeyProvider, StaticKeyProvider,
};
pub use error::{KeyLoadError, PurgeError, PurgeFailure, SigningError, TransportError};
pub use purger::{CachePurger, PurgeReport, VariantOutcome, VariantResult};
pub use signer::{encode_signature, sign, sign_path};
pub use transport::{HttpTransport, ReqwestTransport, TransportResponse};
pub use variant::CacheVariant;
