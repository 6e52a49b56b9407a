//! Shared test fixtures: a scripted fetcher and an in-memory store
//!
//! The fetcher records per-URL attempt counts and flags concurrent fetches
//! of the same URL, which several tests use to verify the single-owner
//! guarantee of the shared queue.

#![allow(dead_code)]

use image_dl::{FetchError, Fetcher, ImageStore, StoreError};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Per-URL behavior script for [`MockFetcher`]
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Every attempt succeeds
    AlwaysSucceed,
    /// Every attempt fails
    AlwaysFail,
    /// Fail this many attempts, then succeed
    FailTimes(u32),
}

/// Scripted [`Fetcher`] with attempt accounting and concurrency detection
pub struct MockFetcher {
    scripts: HashMap<String, Script>,
    default_script: Script,
    /// Artificial per-fetch latency, to widen the window for overlap detection
    latency: Duration,
    calls: Mutex<HashMap<String, u32>>,
    order: Mutex<Vec<String>>,
    in_flight: Mutex<HashSet<String>>,
    overlap_detected: AtomicBool,
}

impl MockFetcher {
    pub fn new(default_script: Script) -> Self {
        Self {
            scripts: HashMap::new(),
            default_script,
            latency: Duration::ZERO,
            calls: Mutex::new(HashMap::new()),
            order: Mutex::new(Vec::new()),
            in_flight: Mutex::new(HashSet::new()),
            overlap_detected: AtomicBool::new(false),
        }
    }

    pub fn script(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of fetch attempts made for `url`
    pub fn attempts(&self, url: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or_default()
    }

    /// Total fetch attempts across all URLs
    pub fn total_attempts(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    /// True if the same URL was ever fetched by two workers at once
    pub fn saw_concurrent_fetch_of_same_url(&self) -> bool {
        self.overlap_detected.load(Ordering::SeqCst)
    }

    /// URLs in the order they were fetched (retries appear once per attempt)
    pub fn fetch_order(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            let counter = calls.entry(url.to_string()).or_insert(0);
            *counter += 1;
            *counter
        };
        self.order.lock().unwrap().push(url.to_string());

        if !self.in_flight.lock().unwrap().insert(url.to_string()) {
            self.overlap_detected.store(true, Ordering::SeqCst);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.in_flight.lock().unwrap().remove(url);

        let script = self
            .scripts
            .get(url)
            .copied()
            .unwrap_or(self.default_script);
        let succeed = match script {
            Script::AlwaysSucceed => true,
            Script::AlwaysFail => false,
            Script::FailTimes(n) => attempt > n,
        };

        if succeed {
            Ok(format!("bytes-of-{url}").into_bytes())
        } else {
            Err(FetchError::Other(format!(
                "scripted failure on attempt {attempt}"
            )))
        }
    }
}

/// In-memory [`ImageStore`]
///
/// `contains` reflects what has been persisted (plus any pre-seeded URLs),
/// and URLs listed as broken fail persistence to exercise the terminal
/// storage-failure path.
#[derive(Default)]
pub struct MemoryStore {
    persisted: Mutex<HashMap<String, Vec<u8>>>,
    preexisting: Mutex<HashSet<String>>,
    broken: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `url` as already downloaded, so the engine skips it
    pub fn seed(self, url: &str) -> Self {
        self.preexisting.lock().unwrap().insert(url.to_string());
        self
    }

    /// Make persistence fail for `url`
    pub fn break_url(self, url: &str) -> Self {
        self.broken.lock().unwrap().insert(url.to_string());
        self
    }

    pub fn persisted_count(&self) -> usize {
        self.persisted.lock().unwrap().len()
    }

    pub fn bytes_for(&self, url: &str) -> Option<Vec<u8>> {
        self.persisted.lock().unwrap().get(url).cloned()
    }

    /// The synthetic path this store files `url` under
    pub fn path_for(url: &str) -> PathBuf {
        PathBuf::from("mem").join(url.replace(['/', ':'], "_"))
    }
}

#[async_trait::async_trait]
impl ImageStore for MemoryStore {
    async fn existing(&self, url: &str) -> Option<PathBuf> {
        let present = self.preexisting.lock().unwrap().contains(url)
            || self.persisted.lock().unwrap().contains_key(url);
        present.then(|| Self::path_for(url))
    }

    async fn persist(&self, url: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        if self.broken.lock().unwrap().contains(url) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "scripted storage failure",
            )));
        }
        self.persisted
            .lock()
            .unwrap()
            .insert(url.to_string(), bytes.to_vec());
        Ok(Self::path_for(url))
    }
}

/// A config suited to fast tests: no inter-attempt sleep
pub fn fast_config() -> image_dl::Config {
    image_dl::Config {
        sleep_time: 0,
        ..Default::default()
    }
}
