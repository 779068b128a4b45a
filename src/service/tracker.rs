use super::Error;
use super::models::{SessionSnapshot, SessionStatus};
use crate::engine::{Engine, EngineConfig, Outcome, ProgressSink, ProgressSnapshot};
use crate::models::Parameters;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::instrument;
use uuid::Uuid;

type Publisher = Arc<watch::Sender<Arc<SessionSnapshot>>>;

/// Shortest period the reaper ticks at; `tokio::time::interval` rejects a zero period.
const MIN_REAP_INTERVAL: Duration = Duration::from_millis(1);

struct SessionEntry {
    snapshots: watch::Receiver<Arc<SessionSnapshot>>,
    cancelled: Arc<AtomicBool>,
    /// Milliseconds since the tracker's epoch.
    last_access: AtomicU64,
}

impl SessionEntry {
    fn current(&self) -> Arc<SessionSnapshot> {
        self.snapshots.borrow().clone()
    }
}

/// Forwards engine progress into the session's watch channel.
struct WatchSink {
    publisher: Publisher,
}

impl ProgressSink for WatchSink {
    fn publish(&mut self, snapshot: ProgressSnapshot) {
        self.publisher
            .send_replace(Arc::new(SessionSnapshot::running(snapshot)));
    }
}

/// Concurrent registry of optimization sessions.
///
/// Each session is written only by its own run, through a watch channel;
/// readers get the latest immutable snapshot without waiting on the run.
#[derive(Clone)]
pub struct SessionTracker {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    permits: Arc<Semaphore>,
    config: Arc<EngineConfig>,
    epoch: Instant,
}

impl SessionTracker {
    pub fn new(config: EngineConfig, max_concurrent_runs: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            permits: Arc::new(Semaphore::new(max_concurrent_runs.max(1))),
            config: Arc::new(config),
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Registers a `Running` session and starts its run in the background.
    #[instrument(level = "info", skip(self, parameters), fields(population_size = parameters.population_size, generations = parameters.generations))]
    pub async fn create(&self, parameters: Parameters) -> Result<Uuid, Error> {
        let id = Uuid::now_v7();
        let total_generations = parameters.generations;
        let engine = Engine::new(parameters, (*self.config).clone())?;

        let (sender, receiver) = watch::channel(Arc::new(SessionSnapshot::running(
            ProgressSnapshot::initial(total_generations),
        )));
        let cancelled = Arc::new(AtomicBool::new(false));

        self.sessions.write().await.insert(
            id,
            SessionEntry {
                snapshots: receiver,
                cancelled: cancelled.clone(),
                last_access: AtomicU64::new(self.now_ms()),
            },
        );

        tokio::spawn(drive(
            id,
            engine,
            Arc::new(sender),
            cancelled,
            self.permits.clone(),
        ));

        tracing::info!(message = "Session created", session_id = %id);

        Ok(id)
    }

    /// Latest snapshot of a session.
    pub async fn snapshot(&self, id: Uuid) -> Result<Arc<SessionSnapshot>, Error> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id).ok_or(Error::SessionNotFound(id))?;
        entry.last_access.store(self.now_ms(), Ordering::Relaxed);
        Ok(entry.current())
    }

    /// Final outcome once the session completed.
    pub async fn result(&self, id: Uuid) -> Result<Arc<Outcome>, Error> {
        let snapshot = self.snapshot(id).await?;
        match snapshot.status {
            SessionStatus::Running => Err(Error::NotReady(id)),
            SessionStatus::Failed => Err(Error::EngineFailure(
                snapshot.error.clone().unwrap_or_default(),
            )),
            SessionStatus::Completed => snapshot.outcome.clone().ok_or(Error::NotReady(id)),
        }
    }

    /// Waits until the session reaches a terminal status.
    pub async fn wait(&self, id: Uuid) -> Result<Arc<SessionSnapshot>, Error> {
        let mut receiver = {
            let sessions = self.sessions.read().await;
            let entry = sessions.get(&id).ok_or(Error::SessionNotFound(id))?;
            entry.snapshots.clone()
        };

        if let Ok(snapshot) = receiver
            .wait_for(|snapshot| snapshot.status.is_terminal())
            .await
        {
            return Ok(snapshot.clone());
        }

        // The run is gone; the channel still holds its last snapshot
        Ok(receiver.borrow().clone())
    }

    /// Asks the run to stop at the next generation boundary. Terminal sessions are left untouched.
    #[instrument(level = "info", skip(self), fields(session_id = %id))]
    pub async fn cancel(&self, id: Uuid) -> Result<(), Error> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id).ok_or(Error::SessionNotFound(id))?;
        entry.cancelled.store(true, Ordering::Release);
        entry.last_access.store(self.now_ms(), Ordering::Relaxed);
        Ok(())
    }

    /// Forgets a session, cancelling its run if it is still going.
    #[instrument(level = "info", skip(self), fields(session_id = %id))]
    pub async fn remove(&self, id: Uuid) -> Result<(), Error> {
        let entry = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(Error::SessionNotFound(id))?;
        entry.cancelled.store(true, Ordering::Release);
        Ok(())
    }

    /// Removes terminal sessions not accessed for at least `retention`. Returns how many were removed.
    #[instrument(level = "debug", skip(self))]
    pub async fn reap(&self, retention: Duration) -> usize {
        let now = self.now_ms();
        let retention = retention.as_millis() as u64;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let idle = now.saturating_sub(entry.last_access.load(Ordering::Relaxed));
            !(entry.current().status.is_terminal() && idle >= retention)
        });
        let removed = before - sessions.len();

        if removed > 0 {
            tracing::info!(message = "Reaped idle sessions", removed = removed);
        }
        removed
    }

    /// Periodically reaps idle terminal sessions until the returned handle is aborted.
    pub fn spawn_reaper(&self, retention: Duration, interval: Duration) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(MIN_REAP_INTERVAL));
            loop {
                ticker.tick().await;
                tracker.reap(retention).await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Runs one engine on the blocking pool and publishes its terminal snapshot.
async fn drive(
    id: Uuid,
    engine: Engine,
    publisher: Publisher,
    cancelled: Arc<AtomicBool>,
    permits: Arc<Semaphore>,
) {
    let _permit = match permits.acquire_owned().await {
        Ok(permit) => permit,
        Err(err) => {
            let last = publisher.borrow().progress.clone();
            publisher.send_replace(Arc::new(SessionSnapshot::failed(last, err.to_string())));
            return;
        }
    };

    let sink = WatchSink {
        publisher: publisher.clone(),
    };
    let joined = tokio::task::spawn_blocking(move || {
        let mut engine = engine;
        let mut sink = sink;
        engine.run(&mut sink, &*cancelled)
    })
    .await;

    let last = publisher.borrow().progress.clone();
    let terminal = match joined {
        Ok(Ok(outcome)) => SessionSnapshot::completed(last, outcome),
        Ok(Err(err)) => SessionSnapshot::failed(last, err.to_string()),
        Err(err) => {
            tracing::error!(message = "Engine task aborted", session_id = %id, err = %err);
            SessionSnapshot::failed(last, format!("engine failure: {err}"))
        }
    };

    tracing::info!(message = "Session finished", session_id = %id, status = ?terminal.status);
    publisher.send_replace(Arc::new(terminal));
}
