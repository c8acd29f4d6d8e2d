//! In-memory client and connector that count lifecycle calls, for tests.

use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Collection, Connector, StorageClient};
use crate::config::ClientOptions;
use crate::error::{Result, StorageError};

/// Shared counters observed by tests after the client has been dropped
#[derive(Debug, Default, Clone)]
pub struct CallCounts {
    pub connects: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl CallCounts {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct MockClient {
    uri: String,
    options: ClientOptions,
    names: std::sync::Mutex<Vec<String>>,
    counts: CallCounts,
    closed: bool,
    fail_close: bool,
    fail_listing: bool,
}

impl MockClient {
    pub fn new(uri: &str, names: &[&str], counts: CallCounts) -> Self {
        Self {
            uri: uri.to_string(),
            options: ClientOptions::default(),
            names: std::sync::Mutex::new(names.iter().map(|n| n.to_string()).collect()),
            counts,
            closed: false,
            fail_close: false,
            fail_listing: false,
        }
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn already_closed(mut self) -> Self {
        self.closed = true;
        self
    }

    fn collection(name: &str) -> Collection {
        Collection {
            name: name.to_string(),
            path: PathBuf::from("/mock/collections").join(name),
            metadata: json!({ "name": name }),
        }
    }

    fn names(&self) -> Vec<String> {
        self.names.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl StorageClient for MockClient {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn options(&self) -> &ClientOptions {
        &self.options
    }

    async fn collections(&self) -> std::result::Result<Vec<Collection>, StorageError> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        if self.fail_listing {
            return Err(StorageError::Io(std::io::Error::other("listing failed")));
        }
        let mut names = self.names();
        names.sort();
        Ok(names.iter().map(|n| Self::collection(n)).collect())
    }

    async fn get_collection(
        &self,
        name: &str,
    ) -> std::result::Result<Option<Collection>, StorageError> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        Ok(self
            .names()
            .iter()
            .find(|n| *n == name)
            .map(|n| Self::collection(n)))
    }

    async fn create_collection(
        &self,
        name: &str,
    ) -> std::result::Result<Collection, StorageError> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        let mut names = self.names.lock().map_err(|_| StorageError::Closed)?;
        if names.iter().any(|n| n == name) {
            return Err(StorageError::CollectionExists(name.to_string()));
        }
        names.push(name.to_string());
        Ok(Self::collection(name))
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> std::result::Result<(), StorageError> {
        self.counts.closes.fetch_add(1, Ordering::SeqCst);
        self.closed = true;
        if self.fail_close {
            return Err(StorageError::Io(std::io::Error::other("close failed")));
        }
        Ok(())
    }
}

/// Connector handing out [`MockClient`]s with a fixed collection list
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    pub names: Vec<&'static str>,
    pub counts: CallCounts,
    pub fail_close: bool,
    pub fail_listing: bool,
}

impl MockConnector {
    pub fn with_collections(names: &[&'static str]) -> Self {
        Self {
            names: names.to_vec(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        uri: &str,
        _options: &ClientOptions,
    ) -> Result<Box<dyn StorageClient>> {
        self.counts.connects.fetch_add(1, Ordering::SeqCst);
        let mut client = MockClient::new(uri, &self.names, self.counts.clone());
        if self.fail_close {
            client = client.failing_close();
        }
        if self.fail_listing {
            client = client.failing_listing();
        }
        Ok(Box::new(client))
    }
}
