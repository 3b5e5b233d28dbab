//! Scripted [`PageFetcher`] that serves canned responses and counts calls.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::fetch::{FetchError, FetchOptions, FetchResponse, PageFetcher, ProbeResult};

#[derive(Default)]
pub struct StubFetcher {
    pages: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    sizes: Mutex<HashMap<String, u64>>,
    fetch_calls: AtomicUsize,
    probe_calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut pages) = self.pages.lock() {
            pages.insert(url.to_string(), (status, body.into()));
        }
        self
    }

    pub fn with_size(self, url: &str, size: u64) -> Self {
        if let Ok(mut sizes) = self.sizes.lock() {
            sizes.insert(url.to_string(), size);
        }
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str, _options: &FetchOptions) -> Result<FetchResponse, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if url.is_empty() {
            return Err(FetchError::invalid_url(url));
        }
        let pages = self
            .pages
            .lock()
            .map_err(|_| FetchError::timeout(url))?;
        pages
            .get(url)
            .map(|(status, body)| FetchResponse::new(*status, body.clone()))
            .ok_or_else(|| FetchError::timeout(url))
    }

    async fn probe(&self, url: &str, _options: &FetchOptions) -> Result<ProbeResult, FetchError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let sizes = self.sizes.lock().map_err(|_| FetchError::timeout(url))?;
        sizes
            .get(url)
            .map(|size| ProbeResult {
                status: 200,
                content_length: Some(*size),
            })
            .ok_or_else(|| FetchError::timeout(url))
    }
}
