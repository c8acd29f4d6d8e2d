//! Local filesystem storage backend
//!
//! Layout under the URI root:
//!
//! ```text
//! <root>/collections/<name>/<name>.json    collection metadata
//! <root>/collections/<name>/array_data/    array payloads
//! ```

use async_trait::async_trait;
use serde_json::json;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

use super::{Collection, StorageClient, validate_collection_name};
use crate::config::ClientOptions;
use crate::error::{ConnectionError, StorageError};

const COLLECTIONS_DIR: &str = "collections";
const ARRAY_DATA_DIR: &str = "array_data";

/// Storage client backed by a local directory
#[derive(Debug)]
pub struct FileClient {
    uri: String,
    root: PathBuf,
    options: ClientOptions,
    closed: bool,
}

impl FileClient {
    /// Open the storage rooted at the path of `url`, creating the layout if missing.
    pub async fn open(
        uri: &str,
        url: &Url,
        options: ClientOptions,
    ) -> Result<Self, ConnectionError> {
        let root = url
            .to_file_path()
            .map_err(|_| ConnectionError::ConnectFailed {
                uri: uri.to_string(),
                reason: "URI does not point to a local path".to_string(),
            })?;

        fs::create_dir_all(root.join(COLLECTIONS_DIR))
            .await
            .map_err(|e| ConnectionError::ConnectFailed {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;

        info!(
            uri,
            workers = ?options.workers,
            memory_limit = ?options.memory_limit,
            "Opened file storage client"
        );

        Ok(Self {
            uri: uri.to_string(),
            root,
            options,
            closed: false,
        })
    }

    /// Root directory of the storage
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collections_dir(&self) -> PathBuf {
        self.root.join(COLLECTIONS_DIR)
    }

    fn metadata_path(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{name}.json"))
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.closed {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }

    async fn load(&self, name: &str) -> Result<Option<Collection>, StorageError> {
        let dir = self.collections_dir().join(name);
        let meta_path = Self::metadata_path(&dir, name);

        let content = match fs::read_to_string(&meta_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let metadata: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| StorageError::Corrupted {
                path: meta_path.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Some(Collection {
            name: name.to_string(),
            path: dir,
            metadata,
        }))
    }
}

#[async_trait]
impl StorageClient for FileClient {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn options(&self) -> &ClientOptions {
        &self.options
    }

    async fn collections(&self) -> Result<Vec<Collection>, StorageError> {
        self.ensure_open()?;

        let mut entries = fs::read_dir(self.collections_dir()).await?;
        let mut collections = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match self.load(&name).await {
                Ok(Some(collection)) => collections.push(collection),
                Ok(None) => debug!(name, "Skipping directory without metadata"),
                Err(e) => warn!(name, error = %e, "Skipping unreadable collection"),
            }
        }

        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    async fn get_collection(&self, name: &str) -> Result<Option<Collection>, StorageError> {
        self.ensure_open()?;
        if validate_collection_name(name).is_err() {
            return Ok(None);
        }
        self.load(name).await
    }

    async fn create_collection(&self, name: &str) -> Result<Collection, StorageError> {
        self.ensure_open()?;
        validate_collection_name(name)?;

        if self.load(name).await?.is_some() {
            return Err(StorageError::CollectionExists(name.to_string()));
        }

        let dir = self.collections_dir().join(name);
        fs::create_dir_all(dir.join(ARRAY_DATA_DIR)).await?;

        let metadata = json!({
            "name": name,
            "created": chrono::Utc::now().to_rfc3339(),
        });
        let body = serde_json::to_string_pretty(&metadata).map_err(|e| StorageError::Corrupted {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(Self::metadata_path(&dir, name), body).await?;

        info!(name, "Created collection");
        Ok(Collection {
            name: name.to_string(),
            path: dir,
            metadata,
        })
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        if !self.closed {
            self.closed = true;
            info!(uri = %self.uri, "Closed file storage client");
        }
        Ok(())
    }
}
