//! Connection Manager
//!
//! Lazily establishes the single shared backend connection. The first caller
//! starts the one connect attempt on its own task; everyone else awaits that
//! same attempt. Dropping a waiter never cancels the attempt. The outcome,
//! ready or failed, is final for the manager's lifetime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::{Connector, KvBackend};
use crate::error::{Result, StoreError};

/// Lifecycle of the shared connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Connecting,
    Ready,
    Failed,
}

type Outcome = Result<Arc<dyn KvBackend>>;

// == Connection Manager ==
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    started: AtomicBool,
    /// None until the attempt finishes; written exactly once
    outcome: Arc<watch::Sender<Option<Outcome>>>,
}

impl ConnectionManager {
    pub fn new(connector: impl Connector + 'static) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            connector: Arc::new(connector),
            started: AtomicBool::new(false),
            outcome: Arc::new(outcome),
        }
    }

    // == Connect ==
    /// Resolves to the ready connection.
    ///
    /// Only the first call reaches the connector; concurrent callers wait on
    /// the in-flight attempt and later callers get the cached outcome,
    /// including a cached failure.
    pub async fn connect(&self) -> Result<Arc<dyn KvBackend>> {
        if !self.started.swap(true, Ordering::SeqCst) {
            self.spawn_attempt();
        }

        let mut ready = self.outcome.subscribe();
        let outcome = {
            let settled = ready.wait_for(Option::is_some).await.map_err(|_| abandoned())?;
            settled.as_ref().cloned()
        };
        outcome.unwrap_or_else(|| Err(abandoned()))
    }

    fn spawn_attempt(&self) {
        let connector = Arc::clone(&self.connector);
        let outcome = Arc::clone(&self.outcome);
        tokio::spawn(async move {
            info!("connecting to backing store");
            let result = connector.connect().await;
            match &result {
                Ok(_) => info!("backing store ready"),
                Err(e) => warn!(error = %e, "backing store connection failed"),
            }
            outcome.send_replace(Some(result));
        });
    }

    /// Same future as `connect`.
    pub async fn wait(&self) -> Result<Arc<dyn KvBackend>> {
        self.connect().await
    }

    /// Runs `callback` with the ready connection on a spawned task.
    ///
    /// The callback is skipped when the connection fails; the failure is
    /// returned through the task handle instead.
    pub fn wait_then<F>(self: &Arc<Self>, callback: F) -> JoinHandle<Result<()>>
    where
        F: FnOnce(Arc<dyn KvBackend>) + Send + 'static,
    {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let client = manager.connect().await?;
            callback(client);
            Ok(())
        })
    }

    /// The connection if it is already established. Never starts a connect.
    pub fn client(&self) -> Option<Arc<dyn KvBackend>> {
        match &*self.outcome.borrow() {
            Some(Ok(client)) => Some(Arc::clone(client)),
            _ => None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        match &*self.outcome.borrow() {
            Some(Ok(_)) => ConnectionState::Ready,
            Some(Err(_)) => ConnectionState::Failed,
            None if self.started.load(Ordering::SeqCst) => ConnectionState::Connecting,
            None => ConnectionState::Uninitialized,
        }
    }
}

fn abandoned() -> StoreError {
    StoreError::Connection("connection attempt abandoned".to_string())
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .finish()
    }
}
