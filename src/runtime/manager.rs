//! Reload Manager: owns the current snapshot and keeps it fresh.
//!
//! # States
//! ```text
//! Stopped → Starting: start() called
//! Starting → Running: first load succeeded
//! Starting → Stopped: first load failed (error returned to the caller)
//! Running → Stopping → Stopped: stop() called
//! ```
//!
//! # Design Decisions
//! - Single writer: only reloads run by the manager swap the snapshot
//! - Readers load the snapshot lock-free and never see partial state
//! - A failed reload keeps the last good snapshot
//! - Loads never overlap; the poll loop waits for one to finish before scheduling the next
//! - Unchanged content (same SHA-256) is neither swapped nor dispatched

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::observability::metrics;
use crate::resilience::backoff::RetryPolicy;
use crate::resilience::timeouts::with_timeout;
use crate::runtime::error::{LoadError, ManagerError};
use crate::runtime::listener::{Listener, Registry};
use crate::runtime::loader::Loader;
use crate::source::{SourceReader, WorkingDir};

/// Receives every reload failure after the first load.
pub type ErrorSink = Arc<dyn Fn(&LoadError) + Send + Sync>;

/// How a manager finds and refreshes its document.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Document path or object key. `None` yields an empty snapshot.
    pub path: Option<String>,

    pub working_dir: WorkingDir,

    /// Poll period. Zero disables periodic reloads; only the first load and
    /// manual reloads happen.
    pub reload_period: Duration,

    /// Deadline for one fetch + decode.
    pub reload_timeout: Duration,

    pub retry: RetryPolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            path: None,
            working_dir: WorkingDir::Process,
            reload_period: Duration::from_secs(10),
            reload_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Result of a successful reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new snapshot was published.
    Updated,
    /// The document did not change since the last published snapshot.
    Unchanged,
}

enum Loaded<T> {
    New { snapshot: Arc<T>, hash: String },
    Unchanged,
}

struct Control {
    state: ManagerState,
    /// Set by stop(); later subscriptions get an already-closed listener.
    retired: bool,
    hash: Option<String>,
    shutdown: Option<broadcast::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

struct Shared<T> {
    config: ManagerConfig,
    source: Arc<dyn SourceReader>,
    loader: Arc<dyn Loader<T>>,
    error_sink: Option<ErrorSink>,
    current: ArcSwapOption<T>,
    registry: Registry<T>,
    /// Guards lifecycle state; held while publishing so subscription and
    /// dispatch are ordered.
    control: Mutex<Control>,
    /// Serialises loads between the poll loop and manual reloads.
    reload_lock: tokio::sync::Mutex<()>,
}

/// Keeps a typed configuration snapshot fresh and fans it out to listeners.
///
/// Cloning is cheap; all clones share the same snapshot and listeners. Call
/// [`stop`](Manager::stop) before dropping the last clone, otherwise the
/// poll task keeps running.
pub struct Manager<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Manager<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for Manager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("path", &self.shared.config.path)
            .field("state", &self.state())
            .field("listeners", &self.shared.registry.len())
            .finish()
    }
}

impl<T: Send + Sync + 'static> Manager<T> {
    pub fn new(config: ManagerConfig, source: Arc<dyn SourceReader>, loader: Arc<dyn Loader<T>>) -> Self {
        Self::build(config, source, loader, None)
    }

    /// Like [`new`](Manager::new), additionally reporting every periodic
    /// reload failure to `sink`.
    pub fn with_error_sink(
        config: ManagerConfig,
        source: Arc<dyn SourceReader>,
        loader: Arc<dyn Loader<T>>,
        sink: ErrorSink,
    ) -> Self {
        Self::build(config, source, loader, Some(sink))
    }

    fn build(
        config: ManagerConfig,
        source: Arc<dyn SourceReader>,
        loader: Arc<dyn Loader<T>>,
        error_sink: Option<ErrorSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                source,
                loader,
                error_sink,
                current: ArcSwapOption::empty(),
                registry: Registry::new(),
                control: Mutex::new(Control {
                    state: ManagerState::Stopped,
                    retired: false,
                    hash: None,
                    shutdown: None,
                    task: None,
                }),
                reload_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Perform the mandatory first load and start polling.
    ///
    /// An error here means the embedding process has no usable
    /// configuration; the manager is back in `Stopped`.
    pub async fn start(&self) -> Result<(), ManagerError> {
        {
            let mut control = self.shared.lock_control();
            if control.state != ManagerState::Stopped {
                return Err(ManagerError::AlreadyStarted);
            }
            control.state = ManagerState::Starting;
            control.retired = false;
        }

        let loaded = {
            let _guard = self.shared.reload_lock.lock().await;
            self.shared.load_snapshot().await
        };

        let mut control = self.shared.lock_control();
        if control.state != ManagerState::Starting {
            // stop() won the race; it finishes the transition to Stopped.
            return Err(ManagerError::NotRunning);
        }

        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                control.state = ManagerState::Stopped;
                drop(control);
                metrics::record_reload_failure(err.kind());
                tracing::error!(
                    path = ?self.shared.config.path,
                    error = %err,
                    "Initial runtime config load failed"
                );
                return Err(ManagerError::InitialLoad(err));
            }
        };

        let delivered = match loaded {
            Loaded::New { snapshot, hash } => {
                control.hash = Some(hash);
                self.shared.current.store(Some(snapshot.clone()));
                self.shared.registry.dispatch(&snapshot)
            }
            Loaded::Unchanged => 0,
        };
        control.state = ManagerState::Running;

        if !self.shared.config.reload_period.is_zero() {
            let (tx, rx) = broadcast::channel(1);
            control.shutdown = Some(tx);
            control.task = Some(tokio::spawn(poll_loop(self.shared.clone(), rx)));
        }
        drop(control);

        metrics::record_reload_success("updated");
        tracing::info!(
            path = ?self.shared.config.path,
            backend = self.shared.source.name(),
            reload_period = ?self.shared.config.reload_period,
            listeners = delivered,
            "Runtime config manager started"
        );
        Ok(())
    }

    /// Stop polling and close every listener. Idempotent.
    ///
    /// A load still in flight is abandoned and its result discarded.
    pub async fn stop(&self) {
        let task = {
            let mut control = self.shared.lock_control();
            if matches!(control.state, ManagerState::Stopped | ManagerState::Stopping) {
                return;
            }
            control.state = ManagerState::Stopping;
            control.retired = true;
            if let Some(tx) = control.shutdown.take() {
                let _ = tx.send(());
            }
            self.shared.registry.close_all();
            control.task.take()
        };

        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Runtime config poll task ended abnormally");
            }
        }

        self.shared.lock_control().state = ManagerState::Stopped;
        tracing::info!(path = ?self.shared.config.path, "Runtime config manager stopped");
    }

    /// Reload now, outside the regular schedule (signal, file watch).
    pub async fn reload(&self) -> Result<ReloadOutcome, ManagerError> {
        if self.state() != ManagerState::Running {
            return Err(ManagerError::NotRunning);
        }
        match self.shared.reload_once().await {
            Ok(Some(outcome)) => Ok(outcome),
            Ok(None) => Err(ManagerError::NotRunning),
            Err(err) => Err(ManagerError::Reload(err)),
        }
    }

    /// The latest published snapshot, if any load has succeeded.
    pub fn current(&self) -> Option<Arc<T>> {
        self.shared.current.load_full()
    }

    /// Register a listener. It first receives the current snapshot (if any),
    /// then every snapshot published afterwards.
    ///
    /// After [`stop`](Manager::stop) the listener comes back already closed:
    /// it yields the last snapshot, then `None`.
    pub fn subscribe(&self, buffer: usize) -> Listener<T> {
        let control = self.shared.lock_control();
        let baseline = self.shared.current.load_full();
        if control.retired {
            return self.shared.registry.closed(buffer, baseline);
        }
        self.shared.registry.register(buffer, baseline)
    }

    /// Deregister and close `listener`.
    pub fn unsubscribe(&self, listener: &Listener<T>) {
        self.shared.registry.remove(listener.id());
    }

    pub fn state(&self) -> ManagerState {
        self.shared.lock_control().state
    }

    /// SHA-256 (hex) of the document behind the current snapshot.
    pub fn last_reload_hash(&self) -> Option<String> {
        self.shared.lock_control().hash.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.shared.registry.len()
    }
}

impl<T: Send + Sync + 'static> Shared<T> {
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn read_source(&self) -> Result<Bytes, LoadError> {
        match self.config.path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => Ok(self.source.open(path, &self.config.working_dir).await?),
            None => Ok(Bytes::new()),
        }
    }

    /// Fetch and decode one document. Callers hold `reload_lock`.
    async fn load_snapshot(&self) -> Result<Loaded<T>, LoadError> {
        let current_hash = self.lock_control().hash.clone();
        with_timeout(self.config.reload_timeout, async {
            let raw = self.read_source().await?;
            let hash = format!("{:x}", Sha256::digest(&raw));
            if current_hash.as_deref() == Some(hash.as_str()) && self.current.load().is_some() {
                return Ok(Loaded::Unchanged);
            }
            let snapshot = Arc::new(self.loader.load(&raw)?);
            Ok(Loaded::New { snapshot, hash })
        })
        .await
    }

    /// One reload cycle. `Ok(None)` means the result arrived after stop and
    /// was discarded.
    async fn reload_once(&self) -> Result<Option<ReloadOutcome>, LoadError> {
        let _guard = self.reload_lock.lock().await;

        let loaded = match self.load_snapshot().await {
            Ok(loaded) => loaded,
            Err(err) => {
                self.report(&err);
                return Err(err);
            }
        };

        let mut control = self.lock_control();
        if control.state != ManagerState::Running {
            return Ok(None);
        }

        match loaded {
            Loaded::Unchanged => {
                drop(control);
                metrics::record_reload_success("unchanged");
                tracing::debug!(path = ?self.config.path, "Runtime config unchanged");
                Ok(Some(ReloadOutcome::Unchanged))
            }
            Loaded::New { snapshot, hash } => {
                control.hash = Some(hash.clone());
                self.current.store(Some(snapshot.clone()));
                let delivered = self.registry.dispatch(&snapshot);
                drop(control);
                metrics::record_reload_success("updated");
                tracing::info!(
                    path = ?self.config.path,
                    sha256 = %hash,
                    listeners = delivered,
                    "Runtime config reloaded"
                );
                Ok(Some(ReloadOutcome::Updated))
            }
        }
    }

    fn report(&self, err: &LoadError) {
        metrics::record_reload_failure(err.kind());
        tracing::warn!(
            path = ?self.config.path,
            error = %err,
            retryable = err.is_retryable(),
            "Failed to reload runtime config. Keeping current configuration."
        );
        if let Some(sink) = &self.error_sink {
            sink(err);
        }
    }
}

async fn poll_loop<T: Send + Sync + 'static>(shared: Arc<Shared<T>>, mut shutdown: broadcast::Receiver<()>) {
    let period = shared.config.reload_period;
    let mut failures = 0u32;
    let mut delay = period;

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        let result = tokio::select! {
            _ = shutdown.recv() => break,
            result = shared.reload_once() => result,
        };

        match result {
            Ok(_) => {
                failures = 0;
                delay = period;
            }
            Err(_) => {
                failures = failures.saturating_add(1);
                delay = shared.config.retry.delay(failures, period);
                tracing::debug!(failures, retry_in = ?delay, "Scheduling runtime config retry");
            }
        }
    }

    tracing::debug!("Runtime config poll loop exiting");
}
