//! Storage client contract
//!
//! The shell talks to the storage backend only through [`StorageClient`] and
//! opens clients through a [`Connector`]. The default connector dispatches on
//! the URI scheme:
//! - `file://` opens a [`FileClient`] rooted at the URI path
//! - `http://` and `https://` are valid URIs but have no backend in this build

mod file;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::config::ClientOptions;
use crate::error::{ConnectionError, Result, ShellError, StorageError};

pub use file::FileClient;

/// URI schemes accepted by [`validate_uri`]
pub const SUPPORTED_SCHEMES: &[&str] = &["file", "http", "https"];

/// A named collection managed by the storage backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection name
    pub name: String,

    /// Directory holding the collection
    #[serde(skip)]
    pub path: PathBuf,

    /// Raw metadata as stored by the backend
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Connected storage client
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// URI the client was opened with
    fn uri(&self) -> &str;

    /// Options the client was constructed with
    fn options(&self) -> &ClientOptions;

    /// All collections, ordered by name
    async fn collections(&self) -> std::result::Result<Vec<Collection>, StorageError>;

    /// Look up a collection by name
    async fn get_collection(
        &self,
        name: &str,
    ) -> std::result::Result<Option<Collection>, StorageError>;

    /// Create an empty collection
    async fn create_collection(&self, name: &str)
    -> std::result::Result<Collection, StorageError>;

    /// Whether the client has been closed
    fn is_closed(&self) -> bool;

    /// Release the client
    async fn close(&mut self) -> std::result::Result<(), StorageError>;
}

/// Opens storage clients from a URI
#[async_trait]
pub trait Connector: Send + Sync {
    /// Construct a client for `uri`
    async fn connect(&self, uri: &str, options: &ClientOptions)
    -> Result<Box<dyn StorageClient>>;
}

/// Scheme-dispatching connector used by the binary
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConnector;

#[async_trait]
impl Connector for DefaultConnector {
    async fn connect(
        &self,
        uri: &str,
        options: &ClientOptions,
    ) -> Result<Box<dyn StorageClient>> {
        let url = validate_uri(uri)?;
        match url.scheme() {
            "file" => {
                let client = FileClient::open(uri, &url, options.clone()).await?;
                Ok(Box::new(client))
            }
            other => Err(ConnectionError::UnsupportedScheme(other.to_string()).into()),
        }
    }
}

/// Validate a storage URI.
///
/// The scheme must be one of [`SUPPORTED_SCHEMES`]; `file` URIs need an
/// absolute path and `http(s)` URIs need a host.
pub fn validate_uri(uri: &str) -> Result<Url> {
    let url = Url::parse(uri).map_err(|e| ShellError::InvalidUri(format!("'{uri}': {e}")))?;

    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(ShellError::InvalidUri(format!(
            "'{uri}': scheme must be one of {}",
            SUPPORTED_SCHEMES.join(", ")
        )));
    }

    match url.scheme() {
        "file" => {
            if url.path().is_empty() {
                return Err(ShellError::InvalidUri(format!("'{uri}': missing path")));
            }
        }
        _ => {
            if url.host_str().is_none_or(str::is_empty) {
                return Err(ShellError::InvalidUri(format!("'{uri}': missing host")));
            }
        }
    }

    Ok(url)
}

/// Check that a collection name can be used as a directory name
pub fn validate_collection_name(name: &str) -> std::result::Result<(), StorageError> {
    let invalid = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.contains('\0');

    if invalid {
        Err(StorageError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
