//! Session management
//!
//! A [`Session`] owns the single storage client of a shell process together
//! with the "current collection" selected through `use(name)`.
//!
//! The lifecycle is `Unopened -> Open -> Closed`; `Closed` is terminal and
//! closing again is a no-op.

use std::fmt;
use tracing::{debug, info, warn};

use crate::client::{Collection, Connector, StorageClient};
use crate::config::ClientOptions;
use crate::error::{ConnectionError, Result};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No client has been opened yet
    Unopened,

    /// A client is open and usable
    Open,

    /// The client has been released
    Closed,
}

/// Result of `use(name)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseOutcome {
    /// The current collection now refers to this name
    Switched(String),

    /// No collection with this name; the current collection is unchanged
    NotFound(String),
}

impl fmt::Display for UseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UseOutcome::Switched(name) => write!(f, "Saved {name} to 'collection' variable"),
            UseOutcome::NotFound(name) => write!(f, "Collection {name} doesn't exist"),
        }
    }
}

/// The live storage connection plus the user's current collection
pub struct Session {
    client: Option<Box<dyn StorageClient>>,
    state: SessionState,
    collection_names: Vec<String>,
    current: Option<Collection>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("uri", &self.uri())
            .field("state", &self.state)
            .field("collection_names", &self.collection_names)
            .field("current", &self.current.as_ref().map(|c| &c.name))
            .finish()
    }
}

impl Session {
    /// Create an unopened session
    pub fn new() -> Self {
        Self {
            client: None,
            state: SessionState::Unopened,
            collection_names: Vec::new(),
            current: None,
        }
    }

    /// Open a client through `connector` and attach it to this session
    ///
    /// # Arguments
    /// * `connector` - Client factory
    /// * `uri` - Storage URI
    /// * `options` - Constructor options, unset ones omitted
    ///
    /// # Returns
    /// * `Result<()>` - Connection errors propagate unchanged
    pub async fn connect(
        &mut self,
        connector: &dyn Connector,
        uri: &str,
        options: &ClientOptions,
    ) -> Result<()> {
        if self.state != SessionState::Unopened {
            return Err(ConnectionError::AlreadyOpen.into());
        }
        debug!(uri, "Connecting storage client");
        let client = connector.connect(uri, options).await?;
        self.open(client).await
    }

    /// Attach an already constructed client and list its collections
    ///
    /// A client whose collections cannot be listed is closed before the
    /// error is returned as [`ConnectionError::ConnectFailed`].
    pub async fn open(&mut self, client: Box<dyn StorageClient>) -> Result<()> {
        if self.state != SessionState::Unopened {
            return Err(ConnectionError::AlreadyOpen.into());
        }
        if client.is_closed() {
            return Err(ConnectionError::ClientClosed.into());
        }

        let listing = client.collections().await;
        let collections = match listing {
            Ok(collections) => collections,
            Err(e) => {
                let reason = e.to_string();
                let mut client = client;
                if let Err(close_error) = client.close().await {
                    warn!(error = %close_error, "Error while closing storage client");
                }
                return Err(ConnectionError::ConnectFailed {
                    uri: client.uri().to_string(),
                    reason,
                }
                .into());
            }
        };
        self.collection_names = collections.into_iter().map(|c| c.name).collect();

        info!(
            uri = client.uri(),
            collections = self.collection_names.len(),
            "Session opened"
        );
        self.client = Some(client);
        self.state = SessionState::Open;
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a client is open
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// URI of the open client
    pub fn uri(&self) -> Option<&str> {
        self.client.as_deref().map(|c| c.uri())
    }

    /// The open client
    pub fn client(&self) -> Result<&dyn StorageClient> {
        match (self.state, self.client.as_deref()) {
            (SessionState::Open, Some(client)) => Ok(client),
            (SessionState::Closed, _) => Err(ConnectionError::ClientClosed.into()),
            _ => Err(ConnectionError::NotOpen.into()),
        }
    }

    /// Collection names listed when the session was opened
    pub fn collection_names(&self) -> &[String] {
        &self.collection_names
    }

    /// Re-read the collection names from the client
    pub async fn refresh_collections(&mut self) -> Result<()> {
        let names = self
            .client()?
            .collections()
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();
        self.collection_names = names;
        Ok(())
    }

    /// The collection selected with `use`, if any
    pub fn collection(&self) -> Option<&Collection> {
        self.current.as_ref()
    }

    /// Switch the current collection.
    ///
    /// An unknown name is reported through [`UseOutcome::NotFound`] and leaves
    /// the current collection untouched.
    pub async fn use_collection(&mut self, name: &str) -> Result<UseOutcome> {
        let found = self.client()?.get_collection(name).await?;
        match found {
            Some(collection) => {
                debug!(name, "Switched current collection");
                self.current = Some(collection);
                Ok(UseOutcome::Switched(name.to_string()))
            }
            None => Ok(UseOutcome::NotFound(name.to_string())),
        }
    }

    /// Release the client.
    ///
    /// Idempotent: the client is closed at most once and close errors are
    /// logged, never returned.
    ///
    /// # Returns
    /// * `bool` - Whether this call closed a client
    pub async fn close(&mut self) -> bool {
        if self.state == SessionState::Closed {
            return false;
        }
        self.state = SessionState::Closed;
        self.current = None;

        let Some(mut client) = self.client.take() else {
            return false;
        };
        if let Err(e) = client.close().await {
            warn!(error = %e, "Error while closing storage client");
        } else {
            info!(uri = client.uri(), "Session closed");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{CallCounts, MockClient, MockConnector};
    use crate::error::ShellError;

    async fn open_session(connector: &MockConnector) -> Session {
        let mut session = Session::new();
        session
            .connect(connector, "file:///data/", &ClientOptions::default())
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_open_lists_collections() {
        let connector = MockConnector::with_collections(&["b", "a"]);
        let session = open_session(&connector).await;

        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(session.collection_names(), ["a", "b"]);
        assert_eq!(session.uri(), Some("file:///data/"));
        assert!(session.collection().is_none());
    }

    #[tokio::test]
    async fn test_use_switches_and_keeps_on_missing() {
        let connector = MockConnector::with_collections(&["a", "b"]);
        let mut session = open_session(&connector).await;

        let outcome = session.use_collection("a").await.unwrap();
        assert_eq!(outcome, UseOutcome::Switched("a".to_string()));
        assert_eq!(outcome.to_string(), "Saved a to 'collection' variable");
        assert_eq!(session.collection().unwrap().name, "a");

        let outcome = session.use_collection("missing").await.unwrap();
        assert_eq!(outcome.to_string(), "Collection missing doesn't exist");
        assert_eq!(session.collection().unwrap().name, "a");
    }

    #[tokio::test]
    async fn test_close_exactly_once() {
        let connector = MockConnector::with_collections(&["a"]);
        let mut session = open_session(&connector).await;

        assert!(session.close().await);
        assert!(!session.close().await);
        assert_eq!(connector.counts.closes(), 1);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_close_error_is_swallowed() {
        let connector = MockConnector {
            fail_close: true,
            ..MockConnector::with_collections(&["a"])
        };
        let mut session = open_session(&connector).await;

        assert!(session.close().await);
        assert_eq!(connector.counts.closes(), 1);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_use_requires_open_session() {
        let mut session = Session::new();
        assert!(matches!(
            session.use_collection("a").await,
            Err(ShellError::Connection(ConnectionError::NotOpen))
        ));

        session.close().await;
        assert!(matches!(
            session.use_collection("a").await,
            Err(ShellError::Connection(ConnectionError::ClientClosed))
        ));
    }

    #[tokio::test]
    async fn test_second_open_rejected() {
        let connector = MockConnector::with_collections(&[]);
        let mut session = open_session(&connector).await;
        let result = session
            .connect(&connector, "file:///other/", &ClientOptions::default())
            .await;
        assert!(matches!(
            result,
            Err(ShellError::Connection(ConnectionError::AlreadyOpen))
        ));
        assert_eq!(connector.counts.connects(), 1);
    }

    #[tokio::test]
    async fn test_closed_client_rejected_on_open() {
        let client = MockClient::new("file:///x/", &[], Default::default()).already_closed();
        let mut session = Session::new();
        assert!(matches!(
            session.open(Box::new(client)).await,
            Err(ShellError::Connection(ConnectionError::ClientClosed))
        ));
        assert_eq!(session.state(), SessionState::Unopened);
    }

    #[tokio::test]
    async fn test_listing_failure_closes_client() {
        let counts = CallCounts::default();
        let client = MockClient::new("file:///x/", &["a"], counts.clone()).failing_listing();
        let mut session = Session::new();

        let result = session.open(Box::new(client)).await;

        match result {
            Err(ShellError::Connection(ConnectionError::ConnectFailed { uri, reason })) => {
                assert_eq!(uri, "file:///x/");
                assert!(reason.contains("listing failed"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(counts.closes(), 1);
        assert_eq!(session.state(), SessionState::Unopened);
        assert!(session.uri().is_none());
    }
}
