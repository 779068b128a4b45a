use super::models::{ProgressDocument, ResultDocument};
use super::{Error, SessionTracker, projector};
use crate::engine::EngineConfig;
use crate::models::{ParameterDocument, ValidationLimits};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::instrument;
use uuid::Uuid;

/// Entry point for clients: validates parameter documents, starts sessions
/// and projects their state into client documents.
pub struct Service {
    tracker: SessionTracker,
    limits: ValidationLimits,
    retention: Duration,
}

pub struct ServiceBuilder {
    config: EngineConfig,
    limits: ValidationLimits,
    retention: Duration,
    max_concurrent_runs: usize,
}

impl ServiceBuilder {
    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Idle time after which a terminal session may be reaped.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Process-wide limit on runs computing at the same time. Extra runs wait their turn.
    pub fn with_max_concurrent_runs(mut self, max_concurrent_runs: usize) -> Self {
        self.max_concurrent_runs = max_concurrent_runs;
        self
    }

    #[instrument(level = "debug", skip(self), fields(max_concurrent_runs = self.max_concurrent_runs, retention_secs = self.retention.as_secs()))]
    pub fn build(self) -> Service {
        Service {
            tracker: SessionTracker::new(self.config, self.max_concurrent_runs),
            limits: self.limits,
            retention: self.retention,
        }
    }
}

impl Service {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder {
            config: EngineConfig::default(),
            limits: ValidationLimits::default(),
            retention: Duration::from_secs(3600),
            max_concurrent_runs: 4,
        }
    }

    /// Validates `document` and starts an optimization run for it.
    #[instrument(level = "info", skip(self, document))]
    pub async fn start(&self, document: &ParameterDocument) -> Result<Uuid, Error> {
        let parameters = document.validate(&self.limits).inspect_err(|err| {
            tracing::info!(message = "Rejected parameters", field = err.field(), err = %err);
        })?;

        self.tracker.create(parameters).await
    }

    #[instrument(level = "debug", skip(self), fields(session_id = %id))]
    pub async fn progress(&self, id: Uuid) -> Result<ProgressDocument, Error> {
        let snapshot = self.tracker.snapshot(id).await?;
        Ok(projector::progress_document(&snapshot))
    }

    #[instrument(level = "debug", skip(self), fields(session_id = %id))]
    pub async fn result(&self, id: Uuid) -> Result<ResultDocument, Error> {
        let outcome = self.tracker.result(id).await?;
        Ok(projector::result_document(&outcome))
    }

    pub async fn cancel(&self, id: Uuid) -> Result<(), Error> {
        self.tracker.cancel(id).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), Error> {
        self.tracker.remove(id).await
    }

    /// Starts the background task removing terminal sessions idle beyond the retention window.
    pub fn spawn_reaper(&self, interval: Duration) -> JoinHandle<()> {
        self.tracker.spawn_reaper(self.retention, interval)
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }
}
