//! Shared fixtures for amp-cache-purge integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use amp_cache_purge::{
    CachePurger, HttpTransport, StaticKeyProvider, TransportError, TransportResponse,
};
use async_trait::async_trait;
use mockall::mock;

pub const TEST_KEY_PEM: &str = include_str!("../fixtures/test-key.pem");
pub const TEST_KEY_AES256_PEM: &str = include_str!("../fixtures/test-key-aes256.pem");
pub const TEST_KEY_DES3_PEM: &str = include_str!("../fixtures/test-key-des3.pem");
pub const NOT_RSA_PEM: &str = include_str!("../fixtures/not-rsa.pem");
pub const TEST_KEY_PASSPHRASE: &str = "purge-test";

pub const PAGE_URL: &str = "https://www.example.com/amp/test-amp-page";
pub const TIMESTAMP: i64 = 1637421562;

/// Signature of the content purge path for `PAGE_URL` at `TIMESTAMP` with `TEST_KEY_PEM`
pub const GOLDEN_SIGNATURE: &str = "D1fBDOOWbNIl6vCzcsjytt-42u0VHGXqp0rrXxJLCguXvMMUFPMxp5GguI7w76OpTyKFzj2VBdQ5ofD92rBX5Um_aajvnAKTbWOyCqL7_zMRSb_NVYvoTp4qGNdKK95jiCs9_oKaa2oAdhSZ6dJ-EiLVeVh22NADoj0ekBEUGoDKgy5OBMAOLNOBKxuNmqL6OnB1DVsRp197c8kx1Xgf_pZhQN5urttTfoLz3Mzdy1O-mtZzsU0kqURuZe7EdnmJQfhKOFPC46LiZOvWBEfpKLrBjlTa3OTiURe52ARUIm8Nt3oWcJqOPtxDdNwvluo0O1MsUMw_o_59ftZlkTCFqw";

pub fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

pub fn test_key_provider() -> StaticKeyProvider {
    StaticKeyProvider::from_pem(TEST_KEY_PEM, "").expect("test key must parse")
}

pub fn purger_with<T: HttpTransport + 'static>(transport: T) -> CachePurger {
    CachePurger::new(Arc::new(transport), Arc::new(test_key_provider()))
}

pub fn ok() -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::new(200, "OK"))
}

pub fn status(code: u16) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::new(code, ""))
}

pub fn connection_refused(url: &str) -> Result<TransportResponse, TransportError> {
    Err(TransportError::Request {
        url: url.to_string(),
        reason: "connection refused".to_string(),
    })
}

pub fn is_content_purge(url: &str) -> bool {
    url.contains("/update-cache/c/")
}

pub fn is_web_package_purge(url: &str) -> bool {
    url.contains("/update-cache/wp/")
}

pub fn is_viewer_purge(url: &str) -> bool {
    url.contains("/update-cache/v/")
}

pub fn is_viewer_probe(url: &str) -> bool {
    !url.contains("/update-cache/") && url.contains("/v/s/")
}

mock! {
    pub Transport {}

    #[async_trait]
    impl HttpTransport for Transport {
        async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
    }
}

type Responder = dyn Fn(&str) -> Result<TransportResponse, TransportError> + Send + Sync;

/// Transport that answers from a closure and records every URL it was asked for
pub struct RecordingTransport {
    responder: Box<Responder>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingTransport {
    pub fn new<F>(responder: F) -> (Self, Arc<Mutex<Vec<String>>>)
    where
        F: Fn(&str) -> Result<TransportResponse, TransportError> + Send + Sync + 'static,
    {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let transport = Self {
            responder: Box::new(responder),
            calls: calls.clone(),
        };
        (transport, calls)
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        (self.responder)(url)
    }
}
