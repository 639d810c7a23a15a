//! Application data hub.
//!
//! Owns the in-memory snapshot of the four public collections, the bootstrap
//! sequence (seeding, placeholder purge, concurrent initial fetch, change-feed
//! watchers), and the retry/error path. The hub is an explicitly constructed
//! object handed to whoever needs it; disposal is `close()`, not process
//! teardown.
//!
//! Each collection slice has exactly one writer: the watcher task draining
//! that collection's change feed. Manual retries replace the watcher set
//! wholesale (old tasks are aborted first), so snapshot application never
//! races a retry.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::errors::AppError;
use crate::models::{Batch, Book, GoLiveSession, LiveClass};
use crate::store::Store;

/// How long the whole bootstrap may run before the hub stops waiting and
/// surfaces a recoverable timeout error.
pub const BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(15);

const TIMEOUT_ERROR: &str =
    "Connection timeout. Please check your internet connection and try again.";
const CONNECT_ERROR: &str =
    "Failed to connect to the data backend. Please check your internet connection and try again.";

/// Where the hub pulls catalog data from. The store implements this; tests
/// substitute failing or hanging sources.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn ensure_defaults(&self) -> Result<(), AppError>;
    async fn purge_placeholder_batches(&self) -> Result<usize, AppError>;

    async fn fetch_batches(&self) -> Result<Vec<Batch>, AppError>;
    async fn fetch_live_classes(&self) -> Result<Vec<LiveClass>, AppError>;
    async fn fetch_books(&self) -> Result<Vec<Book>, AppError>;
    async fn fetch_sessions(&self) -> Result<Vec<GoLiveSession>, AppError>;

    fn watch_batches(&self) -> watch::Receiver<Vec<Batch>>;
    fn watch_live_classes(&self) -> watch::Receiver<Vec<LiveClass>>;
    fn watch_books(&self) -> watch::Receiver<Vec<Book>>;
    fn watch_sessions(&self) -> watch::Receiver<Vec<GoLiveSession>>;
}

#[async_trait]
impl CatalogSource for Store {
    async fn ensure_defaults(&self) -> Result<(), AppError> {
        Store::ensure_defaults(self).await
    }

    async fn purge_placeholder_batches(&self) -> Result<usize, AppError> {
        Store::purge_placeholder_batches(self).await
    }

    async fn fetch_batches(&self) -> Result<Vec<Batch>, AppError> {
        self.batches.list().await
    }

    async fn fetch_live_classes(&self) -> Result<Vec<LiveClass>, AppError> {
        self.live_classes.list().await
    }

    async fn fetch_books(&self) -> Result<Vec<Book>, AppError> {
        self.books.list().await
    }

    async fn fetch_sessions(&self) -> Result<Vec<GoLiveSession>, AppError> {
        self.sessions.list().await
    }

    fn watch_batches(&self) -> watch::Receiver<Vec<Batch>> {
        self.batches.subscribe()
    }

    fn watch_live_classes(&self) -> watch::Receiver<Vec<LiveClass>> {
        self.live_classes.subscribe()
    }

    fn watch_books(&self) -> watch::Receiver<Vec<Book>> {
        self.books.subscribe()
    }

    fn watch_sessions(&self) -> watch::Receiver<Vec<GoLiveSession>> {
        self.sessions.subscribe()
    }
}

/// Connection state surfaced to the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum HubStatus {
    Loading,
    Ready,
    Error(String),
}

/// The application-wide data cache.
#[derive(Clone)]
pub struct DataHub {
    source: Arc<dyn CatalogSource>,
    bootstrap_timeout: Duration,
    batches: Arc<RwLock<Vec<Batch>>>,
    live_classes: Arc<RwLock<Vec<LiveClass>>>,
    books: Arc<RwLock<Vec<Book>>>,
    sessions: Arc<RwLock<Vec<GoLiveSession>>>,
    status: Arc<RwLock<HubStatus>>,
    watchers: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl DataHub {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self::with_timeout(source, BOOTSTRAP_TIMEOUT)
    }

    pub fn with_timeout(source: Arc<dyn CatalogSource>, bootstrap_timeout: Duration) -> Self {
        Self {
            source,
            bootstrap_timeout,
            batches: Arc::new(RwLock::new(Vec::new())),
            live_classes: Arc::new(RwLock::new(Vec::new())),
            books: Arc::new(RwLock::new(Vec::new())),
            sessions: Arc::new(RwLock::new(Vec::new())),
            status: Arc::new(RwLock::new(HubStatus::Loading)),
            watchers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Run the full bootstrap: seed defaults, purge placeholders, fetch all
    /// collections, install watchers. Surfaces a recoverable error state on
    /// total failure or timeout instead of hanging.
    pub async fn bootstrap(&self) {
        self.set_status(HubStatus::Loading).await;
        tracing::info!("Initializing EduMaster data hub");

        match tokio::time::timeout(self.bootstrap_timeout, self.initialize()).await {
            Ok(Ok(())) => {
                tracing::info!("Data hub ready");
                self.set_status(HubStatus::Ready).await;
            }
            Ok(Err(err)) => {
                tracing::error!("Data hub bootstrap failed: {}", err);
                self.set_status(HubStatus::Error(CONNECT_ERROR.to_string()))
                    .await;
            }
            Err(_) => {
                tracing::error!(
                    "Data hub bootstrap did not complete within {:?}",
                    self.bootstrap_timeout
                );
                self.set_status(HubStatus::Error(TIMEOUT_ERROR.to_string()))
                    .await;
            }
        }
    }

    /// Re-run the whole bootstrap. User-triggered; never automatic.
    pub async fn retry_connection(&self) {
        tracing::info!("Retrying data backend connection");
        self.bootstrap().await;
    }

    /// Abort all collection watchers. The hub keeps its last snapshots but
    /// stops following changes.
    pub async fn close(&self) {
        let mut watchers = self.watchers.lock().await;
        for handle in watchers.drain(..) {
            handle.abort();
        }
    }

    pub async fn status(&self) -> HubStatus {
        self.status.read().await.clone()
    }

    pub async fn batches(&self) -> Vec<Batch> {
        self.batches.read().await.clone()
    }

    pub async fn live_classes(&self) -> Vec<LiveClass> {
        self.live_classes.read().await.clone()
    }

    pub async fn books(&self) -> Vec<Book> {
        self.books.read().await.clone()
    }

    pub async fn sessions(&self) -> Vec<GoLiveSession> {
        self.sessions.read().await.clone()
    }

    async fn set_status(&self, status: HubStatus) {
        *self.status.write().await = status;
    }

    async fn initialize(&self) -> Result<(), AppError> {
        // Seeding problems must not take the whole app down
        if let Err(err) = self.source.ensure_defaults().await {
            tracing::warn!("Failed to seed default data: {}", err);
        }
        if let Err(err) = self.source.purge_placeholder_batches().await {
            tracing::warn!("Failed to purge placeholder batches: {}", err);
        }

        // One failing collection degrades to an empty list, never the whole
        // bootstrap
        let (batches, live_classes, books, sessions) = tokio::join!(
            self.source.fetch_batches(),
            self.source.fetch_live_classes(),
            self.source.fetch_books(),
            self.source.fetch_sessions(),
        );

        *self.batches.write().await = batches.unwrap_or_else(|err| {
            tracing::warn!("Failed to load batches: {}", err);
            Vec::new()
        });
        *self.live_classes.write().await = live_classes.unwrap_or_else(|err| {
            tracing::warn!("Failed to load live classes: {}", err);
            Vec::new()
        });
        *self.books.write().await = books.unwrap_or_else(|err| {
            tracing::warn!("Failed to load books: {}", err);
            Vec::new()
        });
        *self.sessions.write().await = sessions.unwrap_or_else(|err| {
            tracing::warn!("Failed to load go-live sessions: {}", err);
            Vec::new()
        });

        self.install_watchers().await;
        tracing::info!("Change-feed watchers established");

        Ok(())
    }

    async fn install_watchers(&self) {
        let mut watchers = self.watchers.lock().await;
        for handle in watchers.drain(..) {
            handle.abort();
        }
        watchers.push(spawn_watcher(
            self.source.watch_batches(),
            self.batches.clone(),
        ));
        watchers.push(spawn_watcher(
            self.source.watch_live_classes(),
            self.live_classes.clone(),
        ));
        watchers.push(spawn_watcher(self.source.watch_books(), self.books.clone()));
        watchers.push(spawn_watcher(
            self.source.watch_sessions(),
            self.sessions.clone(),
        ));
    }
}

/// Single writer for one collection slice: replaces the cached snapshot
/// wholesale on every change-feed notification.
fn spawn_watcher<T>(
    mut feed: watch::Receiver<Vec<T>>,
    slot: Arc<RwLock<Vec<T>>>,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        while feed.changed().await.is_ok() {
            let snapshot = feed.borrow_and_update().clone();
            *slot.write().await = snapshot;
        }
    })
}
